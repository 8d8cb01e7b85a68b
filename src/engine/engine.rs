use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;

use tracing::{debug, warn};

use crate::engine::narrative_service::NarrativeService;
use crate::engine::protocol::{EngineCommand, EngineResponse};
use crate::engine::session::{PendingRequest, SessionController};
use crate::error::{SessionError, ValidationError};

/// Called after every published response, e.g. to wake the UI.
pub type Notify = Box<dyn Fn() + Send>;

/// Runs the session on its own thread.
///
/// Backend calls go to a short-lived worker thread whose result comes back
/// through the command channel, so the engine keeps answering (and rejecting)
/// commands while a request is in flight.
pub struct Engine {
    rx: Receiver<EngineCommand>,
    loopback: Sender<EngineCommand>,
    tx: Sender<EngineResponse>,
    session: SessionController,
    narrator: Arc<dyn NarrativeService>,
    notify: Option<Notify>,
}

impl Engine {
    pub fn new(
        rx: Receiver<EngineCommand>,
        loopback: Sender<EngineCommand>,
        tx: Sender<EngineResponse>,
        session: SessionController,
        narrator: Arc<dyn NarrativeService>,
    ) -> Self {
        Self {
            rx,
            loopback,
            tx,
            session,
            narrator,
            notify: None,
        }
    }

    pub fn with_notify(mut self, notify: Notify) -> Self {
        self.notify = Some(notify);
        self
    }

    /// Starts an engine thread and returns its command and response ends.
    pub fn spawn(
        session: SessionController,
        narrator: Arc<dyn NarrativeService>,
        notify: Option<Notify>,
    ) -> (Sender<EngineCommand>, Receiver<EngineResponse>) {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (resp_tx, resp_rx) = mpsc::channel();
        let loopback = cmd_tx.clone();

        thread::spawn(move || {
            let mut engine = Engine::new(cmd_rx, loopback, resp_tx, session, narrator);
            if let Some(notify) = notify {
                engine = engine.with_notify(notify);
            }
            engine.run();
        });

        (cmd_tx, resp_rx)
    }

    pub fn run(&mut self) {
        self.publish_snapshot();

        while let Ok(cmd) = self.rx.recv() {
            match cmd {
                EngineCommand::OpenSetup => {
                    match self.session.open_character_setup() {
                        Ok(()) => self.publish_snapshot(),
                        Err(e) => self.reject(e),
                    }
                }

                EngineCommand::StartSession { name, theme } => {
                    let started = self.session.begin_start(&name, theme);
                    self.dispatch(started);
                }

                EngineCommand::SubmitAction(text) => {
                    let pending = self.session.begin_action(&text);
                    self.dispatch(pending);
                }

                EngineCommand::SubmitChoice(index) => {
                    let pending = self.session.begin_choice(index);
                    self.dispatch(pending);
                }

                EngineCommand::Reset => {
                    self.session.reset_session();
                    self.publish_snapshot();
                }

                EngineCommand::NarrativeReady { ticket, result } => {
                    match self.session.complete(ticket, result) {
                        Err(SessionError::Validation(ValidationError::StaleTicket)) => {
                            debug!("dropping response for an abandoned request");
                        }
                        // Request failures are already in the snapshot.
                        Ok(_) | Err(_) => self.publish_snapshot(),
                    }
                }

                EngineCommand::Shutdown => break,
            }
        }
    }

    fn dispatch(&mut self, pending: Result<PendingRequest, ValidationError>) {
        let pending = match pending {
            Ok(pending) => pending,
            Err(e) => return self.reject(e),
        };

        // Show the "awaiting" state before the call returns.
        self.publish_snapshot();

        let narrator = Arc::clone(&self.narrator);
        let loopback = self.loopback.clone();
        thread::spawn(move || {
            let result = narrator.generate(&pending.request);
            let _ = loopback.send(EngineCommand::NarrativeReady {
                ticket: pending.ticket,
                result,
            });
        });
    }

    fn reject(&self, err: ValidationError) {
        warn!(error = %err, "command rejected");
        self.send(EngineResponse::Rejected(err.to_string()));
    }

    fn publish_snapshot(&self) {
        self.send(EngineResponse::Snapshot(self.session.snapshot()));
    }

    fn send(&self, resp: EngineResponse) {
        let _ = self.tx.send(resp);
        if let Some(notify) = &self.notify {
            notify();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use super::*;
    use crate::engine::narrative_service::scripted::{beat, ScriptedNarrator};
    use crate::error::RequestError;
    use crate::model::game_state::Theme;
    use crate::model::narrative::{NarrativeRequest, NarrativeResponse};
    use crate::model::phase::GamePhase;
    use crate::model::snapshot::SessionSnapshot;

    const WAIT: Duration = Duration::from_secs(5);

    /// Holds each request until the test releases it.
    struct GatedNarrator {
        gate: Mutex<Receiver<()>>,
    }

    impl NarrativeService for GatedNarrator {
        fn generate(&self, _request: &NarrativeRequest) -> Result<NarrativeResponse, RequestError> {
            self.gate
                .lock()
                .unwrap()
                .recv()
                .map_err(|_| RequestError::Transport("gate closed".into()))?;
            Ok(beat("Released."))
        }
    }

    fn next_snapshot(rx: &Receiver<EngineResponse>) -> SessionSnapshot {
        match rx.recv_timeout(WAIT).unwrap() {
            EngineResponse::Snapshot(snapshot) => snapshot,
            EngineResponse::Rejected(reason) => panic!("unexpected rejection: {reason}"),
        }
    }

    fn next_rejection(rx: &Receiver<EngineResponse>) -> String {
        match rx.recv_timeout(WAIT).unwrap() {
            EngineResponse::Rejected(reason) => reason,
            EngineResponse::Snapshot(s) => panic!("expected rejection, got {:?}", s.phase),
        }
    }

    #[test]
    fn start_publishes_awaiting_then_playing() {
        let narrator = Arc::new(ScriptedNarrator::new().then(Ok(beat("Dawn."))));
        let (tx, rx) = Engine::spawn(SessionController::default(), narrator, None);

        assert_eq!(next_snapshot(&rx).phase, GamePhase::NotStarted);

        tx.send(EngineCommand::StartSession {
            name: "Ada".into(),
            theme: Theme::Fantasy,
        })
        .unwrap();

        assert_eq!(next_snapshot(&rx).phase, GamePhase::AwaitingResponse);
        let playing = next_snapshot(&rx);
        assert_eq!(playing.phase, GamePhase::Playing);
        assert_eq!(playing.messages[0].text, "Dawn.");

        tx.send(EngineCommand::Shutdown).unwrap();
    }

    #[test]
    fn submission_while_awaiting_is_rejected_not_queued() {
        let (gate_tx, gate_rx) = mpsc::channel();
        let narrator = Arc::new(GatedNarrator {
            gate: Mutex::new(gate_rx),
        });
        let (tx, rx) = Engine::spawn(SessionController::default(), narrator, None);
        next_snapshot(&rx);

        tx.send(EngineCommand::StartSession {
            name: "Ada".into(),
            theme: Theme::Cyberpunk,
        })
        .unwrap();
        assert_eq!(next_snapshot(&rx).phase, GamePhase::AwaitingResponse);
        gate_tx.send(()).unwrap();
        assert_eq!(next_snapshot(&rx).phase, GamePhase::Playing);

        tx.send(EngineCommand::SubmitAction("Knock".into())).unwrap();
        tx.send(EngineCommand::SubmitAction("Knock again".into())).unwrap();

        assert_eq!(next_snapshot(&rx).phase, GamePhase::AwaitingResponse);
        assert!(next_rejection(&rx).contains("awaiting response"));

        gate_tx.send(()).unwrap();
        let done = next_snapshot(&rx);
        assert_eq!(done.phase, GamePhase::Playing);
        let player_lines = done
            .messages
            .iter()
            .filter(|m| m.text.starts_with("Knock"))
            .count();
        assert_eq!(player_lines, 1);

        tx.send(EngineCommand::Shutdown).unwrap();
    }

    #[test]
    fn reset_discards_late_response() {
        let (gate_tx, gate_rx) = mpsc::channel();
        let narrator = Arc::new(GatedNarrator {
            gate: Mutex::new(gate_rx),
        });
        let (tx, rx) = Engine::spawn(SessionController::default(), narrator, None);
        next_snapshot(&rx);

        tx.send(EngineCommand::StartSession {
            name: "Ada".into(),
            theme: Theme::Cyberpunk,
        })
        .unwrap();
        assert_eq!(next_snapshot(&rx).phase, GamePhase::AwaitingResponse);

        tx.send(EngineCommand::Reset).unwrap();
        assert_eq!(next_snapshot(&rx).phase, GamePhase::NotStarted);

        gate_tx.send(()).unwrap();
        assert!(rx.recv_timeout(Duration::from_millis(300)).is_err());

        tx.send(EngineCommand::Shutdown).unwrap();
    }

    #[test]
    fn request_failure_is_published_in_snapshot() {
        let narrator = Arc::new(
            ScriptedNarrator::new().then(Err(RequestError::MissingApiKey)),
        );
        let (tx, rx) = Engine::spawn(SessionController::default(), narrator, None);
        next_snapshot(&rx);

        tx.send(EngineCommand::StartSession {
            name: "Ada".into(),
            theme: Theme::Cyberpunk,
        })
        .unwrap();
        next_snapshot(&rx);
        let failed = next_snapshot(&rx);

        assert_eq!(failed.phase, GamePhase::NotStarted);
        assert!(failed.last_error.unwrap().contains("no API key"));

        tx.send(EngineCommand::Shutdown).unwrap();
    }

    #[test]
    fn invalid_choice_is_rejected() {
        let narrator = Arc::new(ScriptedNarrator::new().then(Ok(beat("Dawn."))));
        let (tx, rx) = Engine::spawn(SessionController::default(), narrator, None);
        next_snapshot(&rx);
        tx.send(EngineCommand::StartSession {
            name: "Ada".into(),
            theme: Theme::Fantasy,
        })
        .unwrap();
        next_snapshot(&rx);
        next_snapshot(&rx);

        tx.send(EngineCommand::SubmitChoice(9)).unwrap();

        assert!(next_rejection(&rx).contains("out of range"));
        tx.send(EngineCommand::Shutdown).unwrap();
    }
}
