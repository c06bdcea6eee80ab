use std::cell::RefCell;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chat_widget::config::Labels;
use chat_widget::error::{SurfaceError, TransportError, WidgetError};
use chat_widget::message::{ChatReply, ChatRequest, ChatResponse, Role};
use chat_widget::surface::{ConsoleSurface, MemorySurface, RenderedContent};
use chat_widget::transport::ChatTransport;
use chat_widget::widget::{
    ChatWidget, IgnoreReason, SendState, Settlement, Submission, is_send_key, submit_shared,
};
use tokio::sync::Semaphore;

/// Observations made by the transport while a request is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct InFlight {
    loading_nodes: usize,
    controls_enabled: bool,
}

/// Replays canned results and records what the view looked like mid-request.
#[derive(Debug)]
struct ScriptedTransport {
    view: MemorySurface,
    replies: Mutex<VecDeque<Result<ChatResponse, String>>>,
    sent: Mutex<Vec<ChatRequest>>,
    in_flight: Mutex<Vec<InFlight>>,
    /// When set, each request waits for a permit before answering.
    gate: Option<Arc<Semaphore>>,
}

impl ScriptedTransport {
    fn new(view: &MemorySurface, replies: Vec<Result<ChatResponse, String>>) -> Self {
        Self {
            view: view.clone(),
            replies: Mutex::new(replies.into()),
            sent: Mutex::new(Vec::new()),
            in_flight: Mutex::new(Vec::new()),
            gate: None,
        }
    }

    fn gated(mut self, gate: &Arc<Semaphore>) -> Self {
        self.gate = Some(Arc::clone(gate));
        self
    }

    fn sent(&self) -> Vec<ChatRequest> {
        self.sent.lock().unwrap().clone()
    }

    fn in_flight(&self) -> Vec<InFlight> {
        self.in_flight.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatTransport for ScriptedTransport {
    async fn send(&self, request: &ChatRequest) -> Result<ChatResponse, TransportError> {
        self.sent.lock().unwrap().push(request.clone());
        self.in_flight.lock().unwrap().push(InFlight {
            loading_nodes: self.view.loading_count(),
            controls_enabled: self.view.controls_enabled(),
        });
        if let Some(gate) = &self.gate {
            gate.acquire().await.expect("gate closed").forget();
        }
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .expect("unexpected request")
            .map_err(TransportError::Other)
    }
}

fn setup(
    replies: Vec<Result<ChatResponse, String>>,
) -> (MemorySurface, ChatWidget<MemorySurface, ScriptedTransport>) {
    let view = MemorySurface::new();
    let transport = ScriptedTransport::new(&view, replies);
    let widget = ChatWidget::attach(view.clone(), transport, Labels::default()).unwrap();
    (view, widget)
}

fn assert_idle(view: &MemorySurface, widget: &ChatWidget<MemorySurface, ScriptedTransport>) {
    assert_eq!(widget.state(), SendState::Idle);
    assert_eq!(view.loading_count(), 0);
    assert!(view.controls_enabled());
    assert!(view.input_focused());
    assert!(view.is_scrolled_to_bottom());
}

#[tokio::test]
async fn test_attach_focuses_input() {
    let (view, widget) = setup(vec![]);
    assert!(view.input_focused());
    assert_eq!(widget.state(), SendState::Idle);
    assert!(view.nodes().is_empty());
}

#[tokio::test]
async fn test_blank_input_is_ignored() {
    let (view, mut widget) = setup(vec![]);

    for input in ["", "   ", "\t\n "] {
        view.set_input(input);
        let submission = widget.submit().await.unwrap();
        assert!(matches!(submission, Submission::Ignored(IgnoreReason::Blank)));
    }

    assert!(view.nodes().is_empty());
    assert!(widget.transport().sent().is_empty());
    assert_eq!(widget.state(), SendState::Idle);
}

#[tokio::test]
async fn test_user_message_is_literal_and_input_cleared() {
    let (view, mut widget) = setup(vec![Ok(ChatResponse::answer("ok"))]);

    view.set_input("  <b>hello</b> **x**  ");
    widget.submit().await.unwrap();

    let users = view.messages(Role::User);
    assert_eq!(users.len(), 1);
    assert_eq!(
        users[0].content,
        RenderedContent::Text("<b>hello</b> **x**".to_string())
    );
    assert_eq!(users[0].class_name, "message user-message");
    assert_eq!(view.input(), "");
    assert_eq!(
        widget.transport().sent(),
        vec![ChatRequest::new("<b>hello</b> **x**")]
    );
}

#[tokio::test]
async fn test_successful_reply_is_formatted() {
    let (view, mut widget) = setup(vec![Ok(ChatResponse::answer("hi **there**"))]);

    view.set_input("hello");
    let submission = widget.submit().await.unwrap();

    match submission {
        Submission::Settled {
            request,
            settlement: Settlement::Replied(ChatReply::Answer(answer)),
        } => {
            assert_eq!(request.message, "hello");
            assert_eq!(answer, "hi **there**");
        }
        other => panic!("unexpected submission: {other:?}"),
    }

    let nodes = view.nodes();
    assert_eq!(nodes.len(), 2);
    assert_eq!(nodes[0].content, RenderedContent::Text("hello".to_string()));
    assert_eq!(nodes[1].class_name, "message bot-message");
    assert_eq!(
        nodes[1].content,
        RenderedContent::Markup("hi <strong>there</strong>".to_string())
    );
    assert_idle(&view, &widget);
}

#[tokio::test]
async fn test_backend_error_is_prefixed() {
    let (view, mut widget) = setup(vec![Ok(ChatResponse::failure("bad"))]);

    view.set_input("hello");
    widget.submit().await.unwrap();

    let bots = view.messages(Role::Bot);
    assert_eq!(bots.len(), 1);
    assert_eq!(bots[0].content.as_str(), "❌ Erro: bad");
    assert_idle(&view, &widget);
}

#[tokio::test]
async fn test_backend_error_text_still_formatted() {
    let (view, mut widget) = setup(vec![Ok(ChatResponse::failure("**falhou**"))]);

    view.set_input("hello");
    widget.submit().await.unwrap();

    assert_eq!(
        view.messages(Role::Bot)[0].content,
        RenderedContent::Markup("❌ Erro: <strong>falhou</strong>".to_string())
    );
}

#[tokio::test]
async fn test_empty_reply_is_reported() {
    let (view, mut widget) = setup(vec![Ok(ChatResponse::default())]);

    view.set_input("hello");
    let submission = widget.submit().await.unwrap();

    assert!(matches!(
        submission,
        Submission::Settled {
            settlement: Settlement::Replied(ChatReply::Empty),
            ..
        }
    ));
    assert_eq!(
        view.messages(Role::Bot)[0].content.as_str(),
        "❌ Erro: resposta vazia do servidor"
    );
}

#[tokio::test]
async fn test_transport_failure_recovers() {
    let (view, mut widget) = setup(vec![Err("Failed to fetch".to_string())]);

    view.set_input("hello");
    let submission = widget.submit().await.unwrap();

    assert!(matches!(
        submission,
        Submission::Settled {
            settlement: Settlement::Failed(TransportError::Other(_)),
            ..
        }
    ));
    let bots = view.messages(Role::Bot);
    assert_eq!(bots.len(), 1);
    assert_eq!(bots[0].content.as_str(), "❌ Erro de conexão: Failed to fetch");
    assert_idle(&view, &widget);
}

#[tokio::test]
async fn test_sending_state_while_in_flight() {
    let (view, mut widget) = setup(vec![
        Ok(ChatResponse::answer("um")),
        Err("offline".to_string()),
        Ok(ChatResponse::failure("dois")),
    ]);

    for text in ["a", "b", "c"] {
        view.set_input(text);
        widget.submit().await.unwrap();
        assert_eq!(view.loading_count(), 0);
    }

    let expected = InFlight {
        loading_nodes: 1,
        controls_enabled: false,
    };
    assert_eq!(widget.transport().in_flight(), vec![expected; 3]);
    assert_eq!(view.nodes().len(), 6);
    assert_idle(&view, &widget);
}

#[tokio::test]
async fn test_custom_labels() {
    let view = MemorySurface::new();
    let transport = ScriptedTransport::new(&view, vec![Err("timeout".to_string())]);
    let labels = Labels {
        loading: "Thinking...".to_string(),
        connection_error_prefix: "Connection error: ".to_string(),
        ..Labels::default()
    };
    let mut widget = ChatWidget::attach(view.clone(), transport, labels).unwrap();

    view.set_input("hello");
    widget.submit().await.unwrap();

    assert_eq!(
        view.messages(Role::Bot)[0].content.as_str(),
        "Connection error: timeout"
    );
}

#[tokio::test]
async fn test_surface_failure_still_restores_controls() {
    let (view, mut widget) = setup(vec![Ok(ChatResponse::answer("unused"))]);

    view.set_input("hello");
    // The user message goes in; the loading indicator is rejected.
    view.fail_append(1);
    let result = widget.submit().await;

    assert!(matches!(
        result,
        Err(WidgetError::Surface(SurfaceError::Host(_)))
    ));
    assert!(widget.transport().sent().is_empty());
    assert_eq!(widget.state(), SendState::Idle);
    assert!(view.controls_enabled());
    assert!(view.input_focused());
}

#[tokio::test(start_paused = true)]
async fn test_cancelled_submit_returns_to_idle() {
    let view = MemorySurface::new();
    let gate = Arc::new(Semaphore::new(0));
    let transport =
        ScriptedTransport::new(&view, vec![Ok(ChatResponse::answer("de novo"))]).gated(&gate);
    let mut widget = ChatWidget::attach(view.clone(), transport, Labels::default()).unwrap();

    view.set_input("hello");
    let timed_out = tokio::time::timeout(Duration::from_millis(50), widget.submit()).await;
    assert!(timed_out.is_err());

    assert_eq!(widget.state(), SendState::Idle);
    assert_eq!(view.loading_count(), 0);
    assert!(view.controls_enabled());
    assert!(view.input_focused());

    gate.add_permits(1);
    view.set_input("again");
    let submission = widget.submit().await.unwrap();

    assert!(matches!(submission, Submission::Settled { .. }));
    assert_eq!(widget.transport().sent().len(), 2);
    let bots = view.messages(Role::Bot);
    assert_eq!(bots.len(), 1);
    assert_eq!(bots[0].content.as_str(), "de novo");
    assert_idle(&view, &widget);
}

#[tokio::test]
async fn test_shared_trigger_while_busy_is_dropped() {
    let view = MemorySurface::new();
    let gate = Arc::new(Semaphore::new(0));
    let transport =
        ScriptedTransport::new(&view, vec![Ok(ChatResponse::answer("um"))]).gated(&gate);
    let widget = RefCell::new(
        ChatWidget::attach(view.clone(), transport, Labels::default()).unwrap(),
    );

    view.set_input("hello");
    let (first, second) = tokio::join!(submit_shared(&widget), async {
        while view.loading_count() == 0 {
            tokio::task::yield_now().await;
        }
        view.set_input("again");
        let second = submit_shared(&widget).await;
        gate.add_permits(1);
        second
    });

    assert!(matches!(first.unwrap(), Submission::Settled { .. }));
    assert!(matches!(
        second.unwrap(),
        Submission::Ignored(IgnoreReason::Busy)
    ));
    let widget = widget.into_inner();
    assert_eq!(widget.transport().sent(), vec![ChatRequest::new("hello")]);
    assert_eq!(view.input(), "again");
    assert_idle(&view, &widget);
}

#[tokio::test]
async fn test_only_send_key_triggers() {
    let view = MemorySurface::new();
    let transport = ScriptedTransport::new(&view, vec![Ok(ChatResponse::answer("ok"))]);
    let widget = RefCell::new(
        ChatWidget::attach(view.clone(), transport, Labels::default()).unwrap(),
    );

    view.set_input("hello");
    for key in ["h", "Shift", "Tab", "Enter"] {
        if is_send_key(key) {
            submit_shared(&widget).await.unwrap();
        }
    }

    assert_eq!(
        widget.borrow().transport().sent(),
        vec![ChatRequest::new("hello")]
    );
    assert_eq!(view.messages(Role::Bot).len(), 1);
}

#[tokio::test]
async fn test_byte_order_mark_only_input_is_ignored() {
    let (view, mut widget) = setup(vec![]);

    view.set_input("\u{FEFF} ");
    let submission = widget.submit().await.unwrap();

    assert!(matches!(submission, Submission::Ignored(IgnoreReason::Blank)));
    assert!(view.nodes().is_empty());
}

#[tokio::test]
async fn test_console_lines_drive_the_widget() {
    let transport =
        ScriptedTransport::new(&MemorySurface::new(), vec![Ok(ChatResponse::answer("**oi**"))]);
    let mut widget =
        ChatWidget::attach(ConsoleSurface::new(Vec::new()), transport, Labels::default())
            .unwrap();

    let blank = widget.submit_line("   ").await.unwrap();
    assert!(matches!(blank, Submission::Ignored(IgnoreReason::Blank)));

    let sent = widget.submit_line("olá").await.unwrap();
    assert!(matches!(sent, Submission::Settled { .. }));

    let out = String::from_utf8(widget.surface().get_ref().clone()).unwrap();
    assert_eq!(
        out,
        "> > » olá\nPensando...\r\x1b[2K\x1b[1moi\x1b[0m\n> "
    );
    assert_eq!(widget.transport().sent(), vec![ChatRequest::new("olá")]);
}
