//! Integration tests for [`handler_chain::HandlerChain`].

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use handler_chain::HandlerChain;
use intake_core::{Handler, HandlerError, HandlerResponse, InboundMessage, IntakeError};

type Log = Arc<Mutex<Vec<String>>>;

/// Records every phase and answers `handle` with a fixed response.
struct Recorder {
    name: &'static str,
    allow: bool,
    response: HandlerResponse,
    log: Log,
}

impl Recorder {
    fn new(name: &'static str, response: HandlerResponse, log: &Log) -> Arc<Self> {
        Arc::new(Self {
            name,
            allow: true,
            response,
            log: log.clone(),
        })
    }

    fn blocking(name: &'static str, log: &Log) -> Arc<Self> {
        Arc::new(Self {
            name,
            allow: false,
            response: HandlerResponse::Continue,
            log: log.clone(),
        })
    }
}

#[async_trait]
impl Handler for Recorder {
    async fn before(&self, _message: &InboundMessage) -> intake_core::Result<bool> {
        self.log.lock().unwrap().push(format!("before_{}", self.name));
        Ok(self.allow)
    }

    async fn handle(&self, _message: &InboundMessage) -> intake_core::Result<HandlerResponse> {
        self.log.lock().unwrap().push(format!("handle_{}", self.name));
        Ok(self.response.clone())
    }

    async fn after(&self, _message: &InboundMessage, response: &HandlerResponse) -> intake_core::Result<()> {
        self.log
            .lock()
            .unwrap()
            .push(format!("after_{}:{:?}", self.name, response));
        Ok(())
    }
}

fn message() -> InboundMessage {
    InboundMessage::text("grupo-1", "Ana", "Llavero azul").with_id("m1")
}

fn entries(log: &Log) -> Vec<String> {
    log.lock().unwrap().clone()
}

/// **Test: phases run before (in order) → handle → after (reverse)**
#[tokio::test]
async fn test_phase_order() {
    let log: Log = Default::default();
    let chain = HandlerChain::new()
        .add_handler(Recorder::new("a", HandlerResponse::Continue, &log))
        .add_handler(Recorder::new("b", HandlerResponse::Continue, &log));

    let result = chain.handle(&message()).await.unwrap();

    assert_eq!(result, HandlerResponse::Continue);
    assert_eq!(
        entries(&log),
        vec![
            "before_a",
            "before_b",
            "handle_a",
            "handle_b",
            "after_b:Continue",
            "after_a:Continue"
        ]
    );
}

/// **Test: a before returning false stops everything, no handle or after**
#[tokio::test]
async fn test_before_false_stops_chain() {
    let log: Log = Default::default();
    let chain = HandlerChain::new()
        .add_handler(Recorder::blocking("gate", &log))
        .add_handler(Recorder::new("b", HandlerResponse::Reply("x".into()), &log));

    let result = chain.handle(&message()).await.unwrap();

    assert_eq!(result, HandlerResponse::Stop);
    assert_eq!(entries(&log), vec!["before_gate"]);
}

/// **Test: Reply ends the handle phase and reaches every after**
#[tokio::test]
async fn test_reply_stops_handle_phase() {
    let log: Log = Default::default();
    let chain = HandlerChain::new()
        .add_handler(Recorder::new("skip", HandlerResponse::Ignore, &log))
        .add_handler(Recorder::new("reply", HandlerResponse::Reply("¿Iniciar pedido?".into()), &log))
        .add_handler(Recorder::new("never", HandlerResponse::Continue, &log));

    let result = chain.handle(&message()).await.unwrap();

    assert_eq!(result, HandlerResponse::Reply("¿Iniciar pedido?".into()));
    let log = entries(&log);
    assert!(log.contains(&"handle_skip".to_string()));
    assert!(!log.contains(&"handle_never".to_string()));
    assert_eq!(log.last().unwrap(), "after_skip:Reply(\"¿Iniciar pedido?\")");
}

/// **Test: a handler error propagates out of the chain**
#[tokio::test]
async fn test_handler_error_propagates() {
    struct Failing;

    #[async_trait]
    impl Handler for Failing {
        async fn handle(&self, _message: &InboundMessage) -> intake_core::Result<HandlerResponse> {
            Err(HandlerError::EmptyContent.into())
        }
    }

    let chain = HandlerChain::new().add_handler(Arc::new(Failing));
    let err = chain.handle(&message()).await.unwrap_err();
    assert!(matches!(err, IntakeError::Handler(HandlerError::EmptyContent)));
}

/// **Test: an empty chain continues**
#[tokio::test]
async fn test_empty_chain() {
    let chain = HandlerChain::new();
    assert!(chain.is_empty());
    assert_eq!(chain.handle(&message()).await.unwrap(), HandlerResponse::Continue);
}
