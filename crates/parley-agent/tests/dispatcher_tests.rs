// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end dispatcher behavior over a mock backend.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parley_agent::{ClaimSet, Orchestrator, UserDispatcher};
use parley_core::{Message, MessageStore, ParleyError, ToolCall};
use parley_test_utils::{MemoryStore, MockBackend, TestHarness};
use parley_tools::ToolRegistry;
use serde_json::{Value, json};

fn sum_tools() -> ToolRegistry {
    let mut tools = ToolRegistry::new();
    tools.register_fn("sum", "Adds a and b", json!({"type": "object"}), |args, _| {
        let a = args["a"].as_i64().unwrap_or_default();
        let b = args["b"].as_i64().unwrap_or_default();
        Ok((a + b).to_string())
    });
    tools
}

#[tokio::test]
async fn single_message_round_trip_persists_everything() {
    let harness = TestHarness::builder()
        .with_replies(vec![Message::assistant("hello")])
        .build()
        .await
        .unwrap();

    let out = harness.send("alice", "hi").await.unwrap();

    assert_eq!(out, vec![Message::assistant("hello")]);
    assert_eq!(
        harness.history("alice").await.unwrap(),
        vec![Message::user("hi"), Message::assistant("hello")]
    );
    assert!(harness.store.pending("alice").await.unwrap().is_empty());
    assert!(!harness.dispatcher.is_claimed("alice"));
}

#[tokio::test]
async fn tool_turns_are_persisted_in_order() {
    let call = Message::assistant_tool_calls(
        None,
        vec![ToolCall::new("call_1", "sum", r#"{"a":2,"b":3}"#)],
    );
    let harness = TestHarness::builder()
        .with_replies(vec![call.clone(), Message::assistant("5")])
        .with_tools(sum_tools())
        .build()
        .await
        .unwrap();

    let out = harness.send("alice", "2+3?").await.unwrap();

    let expected = vec![
        call,
        Message::tool_result("call_1", "5"),
        Message::assistant("5"),
    ];
    assert_eq!(out, expected);
    assert_eq!(harness.backend.call_count(), 2);

    let history = harness.history("alice").await.unwrap();
    assert_eq!(history[0], Message::user("2+3?"));
    assert_eq!(&history[1..], expected.as_slice());

    let visible: Vec<_> = out.iter().filter(|m| m.is_user_visible()).collect();
    assert_eq!(visible, vec![&Message::assistant("5")]);
}

#[tokio::test]
async fn concurrent_sender_is_folded_into_running_session() {
    let harness = TestHarness::builder()
        .with_replies(vec![
            Message::assistant("reply one"),
            Message::assistant("reply two"),
        ])
        .with_backend_delay(Duration::from_millis(150))
        .build()
        .await
        .unwrap();

    let dispatcher = harness.dispatcher.clone();
    let first = tokio::spawn(async move {
        dispatcher
            .process("alice", "one", &Value::Null, &Value::Null)
            .await
    });

    tokio::time::sleep(Duration::from_millis(40)).await;
    assert!(harness.dispatcher.is_claimed("alice"));

    // Mutual exclusion: the second caller does not start a session.
    let second = harness.send("alice", "two").await.unwrap();
    assert!(second.is_empty());

    // Drain completeness: the running session answers both messages.
    let first = first.await.unwrap().unwrap();
    assert_eq!(
        first,
        vec![
            Message::assistant("reply one"),
            Message::assistant("reply two")
        ]
    );
    assert_eq!(harness.backend.call_count(), 2);
    assert!(!harness.dispatcher.is_claimed("alice"));

    assert_eq!(
        harness.history("alice").await.unwrap(),
        vec![
            Message::user("one"),
            Message::assistant("reply one"),
            Message::user("two"),
            Message::assistant("reply two"),
        ]
    );

    let requests = harness.backend.requests().await;
    assert_eq!(requests[1].conversation.last(), Some(&Message::user("two")));
}

#[tokio::test]
async fn users_do_not_block_each_other() {
    let harness = TestHarness::builder()
        .with_backend_delay(Duration::from_millis(150))
        .with_memory_store()
        .build()
        .await
        .unwrap();

    let dispatcher = harness.dispatcher.clone();
    let alice = tokio::spawn(async move {
        dispatcher
            .process("alice", "hi", &Value::Null, &Value::Null)
            .await
    });

    tokio::time::sleep(Duration::from_millis(40)).await;
    assert!(harness.dispatcher.is_claimed("alice"));

    let bob = harness.send("bob", "hey").await.unwrap();
    assert_eq!(bob, vec![Message::assistant("mock response")]);

    let alice = alice.await.unwrap().unwrap();
    assert_eq!(alice.len(), 1);
    assert!(harness.claims.is_empty());
}

#[tokio::test]
async fn backend_failure_releases_claim() {
    let harness = TestHarness::builder()
        .with_memory_store()
        .build()
        .await
        .unwrap();
    harness.backend.push_error("upstream down").await;

    let err = harness.send("alice", "hi").await.unwrap_err();
    assert!(matches!(err, ParleyError::Backend { .. }));
    assert!(!harness.dispatcher.is_claimed("alice"));

    // The next message starts a fresh session that sees the earlier one too.
    let out = harness.send("alice", "again").await.unwrap();
    assert_eq!(out, vec![Message::assistant("mock response")]);
    let requests = harness.backend.requests().await;
    let last = &requests.last().unwrap().conversation;
    assert!(last.contains(&Message::user("hi")));
    assert!(last.contains(&Message::user("again")));
}

#[tokio::test]
async fn store_failure_releases_claim() {
    let harness = TestHarness::builder()
        .with_memory_store()
        .build()
        .await
        .unwrap();
    let memory = harness.memory.clone().unwrap();

    harness.dispatcher.submit("alice", "hi").await.unwrap();
    memory.set_failing(true);

    let err = harness
        .dispatcher
        .drain_if_free("alice", &Value::Null, &Value::Null)
        .await
        .unwrap_err();
    assert!(matches!(err, ParleyError::Storage { .. }));
    assert!(!harness.dispatcher.is_claimed("alice"));
}

#[tokio::test]
async fn turn_limit_surfaces_and_releases_claim() {
    let looping = |id: &str| {
        Message::assistant_tool_calls(None, vec![ToolCall::new(id, "sum", "{}")])
    };
    let harness = TestHarness::builder()
        .with_replies(vec![looping("c1"), looping("c2"), looping("c3")])
        .with_tools(sum_tools())
        .with_max_turns(2)
        .build()
        .await
        .unwrap();

    let err = harness.send("alice", "loop").await.unwrap_err();
    assert!(matches!(err, ParleyError::MaxTurnsExceeded { limit: 2 }));
    assert_eq!(harness.backend.call_count(), 2);
    assert!(!harness.dispatcher.is_claimed("alice"));
}

#[tokio::test]
async fn drain_timeout_fails_and_releases_claim() {
    let harness = TestHarness::builder()
        .with_backend_delay(Duration::from_millis(500))
        .with_drain_timeout(Duration::from_millis(50))
        .with_memory_store()
        .build()
        .await
        .unwrap();

    let err = harness.send("alice", "slow").await.unwrap_err();
    assert!(matches!(err, ParleyError::Timeout { .. }));
    assert!(!harness.dispatcher.is_claimed("alice"));
}

#[tokio::test]
async fn dropping_the_drain_future_releases_claim() {
    let harness = TestHarness::builder()
        .with_backend_delay(Duration::from_millis(500))
        .with_memory_store()
        .build()
        .await
        .unwrap();

    let cancelled = tokio::time::timeout(Duration::from_millis(50), harness.send("alice", "hi")).await;
    assert!(cancelled.is_err());
    assert!(!harness.dispatcher.is_claimed("alice"));
}

#[tokio::test]
async fn additional_instructions_see_instruction_args() {
    let harness = TestHarness::builder()
        .with_additional_instructions(|args| match args["locale"].as_str() {
            Some(locale) => format!("Reply in {locale}."),
            None => String::new(),
        })
        .with_memory_store()
        .build()
        .await
        .unwrap();

    harness
        .dispatcher
        .process("alice", "hi", &Value::Null, &json!({"locale": "fr"}))
        .await
        .unwrap();

    let requests = harness.backend.requests().await;
    let conversation = &requests[0].conversation;
    let n = conversation.len();
    assert_eq!(conversation[n - 2], Message::system("Reply in fr."));
    assert_eq!(conversation[n - 1], Message::user("hi"));
}

#[tokio::test]
async fn burst_of_senders_gets_exactly_one_session() {
    let harness = TestHarness::builder()
        .with_backend_delay(Duration::from_millis(30))
        .with_memory_store()
        .build()
        .await
        .unwrap();

    let sends = (0..8).map(|i| {
        let dispatcher = harness.dispatcher.clone();
        async move {
            dispatcher
                .process("alice", &format!("m{i}"), &Value::Null, &Value::Null)
                .await
        }
    });
    let results = futures::future::join_all(sends).await;

    let outputs: Vec<Vec<Message>> = results.into_iter().map(Result::unwrap).collect();
    assert_eq!(outputs.iter().filter(|o| !o.is_empty()).count(), 1);
    let produced: usize = outputs.iter().map(Vec::len).sum();
    assert_eq!(produced, harness.backend.call_count());
    assert!(harness.store.pending("alice").await.unwrap().is_empty());
    assert!(harness.claims.is_empty());

    let history = harness.history("alice").await.unwrap();
    let users = history.iter().filter(|m| m.role == parley_core::Role::User).count();
    assert_eq!(users, 8);
}

/// Queues `user("second")` right after the first unqueue, before the pass
/// reads its history.
struct LateArrival {
    inner: MemoryStore,
    fired: AtomicBool,
}

#[async_trait]
impl MessageStore for LateArrival {
    async fn insert(
        &self,
        user_id: &str,
        pending: bool,
        messages: &[Message],
    ) -> Result<Vec<Message>, ParleyError> {
        self.inner.insert(user_id, pending, messages).await
    }

    async fn unqueue(&self, user_id: &str) -> Result<Vec<Message>, ParleyError> {
        let folded = self.inner.unqueue(user_id).await?;
        if !self.fired.swap(true, Ordering::SeqCst) {
            self.inner
                .insert(user_id, true, &[Message::user("second")])
                .await?;
        }
        Ok(folded)
    }

    async fn read_history(&self, user_id: &str) -> Result<Vec<Message>, ParleyError> {
        self.inner.read_history(user_id).await
    }

    async fn pending(&self, user_id: &str) -> Result<Vec<Message>, ParleyError> {
        self.inner.pending(user_id).await
    }
}

#[tokio::test]
async fn message_queued_after_unqueue_is_answered_once() {
    let store = Arc::new(LateArrival {
        inner: MemoryStore::new(),
        fired: AtomicBool::new(false),
    });
    let backend = Arc::new(MockBackend::new());
    let orchestrator = Orchestrator::builder(backend.clone()).instructions("sys").build();
    let dispatcher = UserDispatcher::new(store.clone(), Arc::new(orchestrator), ClaimSet::new());

    let out = dispatcher
        .process("alice", "first", &Value::Null, &Value::Null)
        .await
        .unwrap();
    assert_eq!(out.len(), 2);
    assert_eq!(backend.call_count(), 2);

    let requests = backend.requests().await;
    assert_eq!(
        requests[0].conversation,
        vec![Message::system("sys"), Message::user("first")]
    );
    assert_eq!(
        requests[1].conversation,
        vec![
            Message::system("sys"),
            Message::user("first"),
            Message::assistant("mock response"),
            Message::user("second"),
        ]
    );
    assert_eq!(
        store.read_history("alice").await.unwrap(),
        vec![
            Message::user("first"),
            Message::assistant("mock response"),
            Message::user("second"),
            Message::assistant("mock response"),
        ]
    );
}
