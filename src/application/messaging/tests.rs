//! Dispatcher tests

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    use crate::application::errors::HandlerError;
    use crate::application::messaging::{DispatchOutcome, EventDispatcher};
    use crate::application::testing::RecordingSession;
    use crate::domain::entities::{
        GroupNotification, InboundEvent, LifecycleEvent, Message, SessionEvent, SessionStatus,
    };
    use crate::domain::traits::{MembershipHandler, MessageHandler, SessionClient};

    /// Fails on "boom", panics on "panic", records everything else
    #[derive(Default)]
    struct FlakyHandler {
        seen: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl MessageHandler for FlakyHandler {
        async fn handle_message(&self, _client: &dyn SessionClient, message: &Message) -> Result<(), HandlerError> {
            match message.body.as_str() {
                "boom" => Err(HandlerError::Internal("boom".to_string())),
                "panic" => panic!("handler exploded"),
                body => {
                    self.seen.lock().unwrap().push(body.to_string());
                    Ok(())
                }
            }
        }
    }

    #[async_trait]
    impl MembershipHandler for FlakyHandler {
        async fn handle_new_member(&self, _client: &dyn SessionClient, n: &GroupNotification) -> Result<(), HandlerError> {
            self.seen.lock().unwrap().push(format!("join:{}", n.participants.join(",")));
            Ok(())
        }

        async fn handle_member_leave(&self, _client: &dyn SessionClient, _n: &GroupNotification) -> Result<(), HandlerError> {
            Err(HandlerError::Internal("leave failed".to_string()))
        }
    }

    fn dispatcher() -> (Arc<FlakyHandler>, EventDispatcher) {
        let handler = Arc::new(FlakyHandler::default());
        let dispatcher = EventDispatcher::new(
            Arc::new(RecordingSession::new()),
            handler.clone(),
            handler.clone(),
        );
        (handler, dispatcher)
    }

    fn message(body: &str) -> SessionEvent {
        InboundEvent::Message(Message::new("c@c.us", "u@c.us", body)).into()
    }

    #[tokio::test]
    async fn test_lifecycle_events_never_fail() {
        let (_, dispatcher) = dispatcher();
        let events = vec![
            LifecycleEvent::Qr(String::new()),
            LifecycleEvent::Qr("2@abc,def".to_string()),
            LifecycleEvent::Authenticated,
            LifecycleEvent::Ready,
            LifecycleEvent::Disconnected(String::new()),
            LifecycleEvent::AuthFailure("bad credentials".to_string()),
        ];

        for event in events {
            assert_eq!(dispatcher.dispatch(event.into()).await, DispatchOutcome::Logged);
        }
    }

    #[tokio::test]
    async fn test_lifecycle_updates_status() {
        let (_, dispatcher) = dispatcher();
        let status = dispatcher.status();
        assert_eq!(*status.borrow(), SessionStatus::Starting);

        dispatcher.dispatch(LifecycleEvent::Qr("abc".to_string()).into()).await;
        assert_eq!(*status.borrow(), SessionStatus::AwaitingQr { qr: "abc".to_string() });

        dispatcher.dispatch(LifecycleEvent::Ready.into()).await;
        assert!(status.borrow().is_ready());
    }

    #[tokio::test]
    async fn test_handler_failures_are_isolated() {
        let (handler, dispatcher) = dispatcher();

        assert_eq!(dispatcher.dispatch(message("one")).await, DispatchOutcome::Handled);
        assert!(matches!(dispatcher.dispatch(message("boom")).await, DispatchOutcome::Failed(e) if e.contains("boom")));
        assert!(matches!(dispatcher.dispatch(message("panic")).await, DispatchOutcome::Failed(e) if e == "handler exploded"));
        assert_eq!(dispatcher.dispatch(message("two")).await, DispatchOutcome::Handled);

        assert_eq!(*handler.seen.lock().unwrap(), vec!["one", "two"]);
    }

    #[tokio::test]
    async fn test_run_preserves_emission_order() {
        let (handler, dispatcher) = dispatcher();
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();

        tx.send(message("a")).unwrap();
        tx.send(message("panic")).unwrap();
        tx.send(InboundEvent::GroupJoin(GroupNotification::new("g@g.us", vec!["x".to_string()])).into()).unwrap();
        tx.send(InboundEvent::GroupLeave(GroupNotification::new("g@g.us", vec!["x".to_string()])).into()).unwrap();
        tx.send(message("b")).unwrap();
        drop(tx);

        dispatcher.run(rx).await;

        assert_eq!(*handler.seen.lock().unwrap(), vec!["a", "join:x", "b"]);
    }
}
