use std::collections::VecDeque;

use tracing::{debug, info, warn};

use crate::engine::apply_narrative::resolve_turn;
use crate::engine::clock::{Clock, SystemClock};
use crate::engine::narrative_service::NarrativeService;
use crate::error::{RequestError, SessionError, ValidationError};
use crate::model::game_state::{PlayerState, Theme};
use crate::model::message::{Message, Role};
use crate::model::narrative::{NarrativeRequest, NarrativeResponse};
use crate::model::phase::GamePhase;
use crate::model::snapshot::SessionSnapshot;

pub const DEFAULT_HISTORY_LIMIT: usize = 5;

/// Identifies one outstanding narrative request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PendingKind {
    Setup,
    Turn,
}

#[derive(Debug, Clone, Copy)]
struct Pending {
    ticket: Ticket,
    kind: PendingKind,
}

/// A request the caller must deliver to a narrative backend, then hand the
/// result back through [`SessionController::complete`].
#[derive(Debug, Clone, PartialEq)]
pub struct PendingRequest {
    pub ticket: Ticket,
    pub request: NarrativeRequest,
}

/// Owns the player and phase for one session.
///
/// Work is split into `begin_*` (validate, record intent, enter
/// `AwaitingResponse`) and [`complete`](Self::complete) (apply the backend's
/// answer). At most one request is outstanding; anything submitted in between
/// is rejected, never queued.
pub struct SessionController {
    phase: GamePhase,
    player: Option<PlayerState>,
    messages: Vec<Message>,
    history: VecDeque<String>,
    history_limit: usize,
    current: Option<NarrativeResponse>,
    last_error: Option<String>,
    pending: Option<Pending>,
    next_ticket: u64,
    clock: Box<dyn Clock>,
}

impl Default for SessionController {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}

impl SessionController {
    pub fn new(history_limit: usize) -> Self {
        Self::with_clock(history_limit, Box::new(SystemClock))
    }

    pub fn with_clock(history_limit: usize, clock: Box<dyn Clock>) -> Self {
        Self {
            phase: GamePhase::NotStarted,
            player: None,
            messages: Vec::new(),
            history: VecDeque::with_capacity(history_limit),
            history_limit,
            current: None,
            last_error: None,
            pending: None,
            next_ticket: 0,
            clock,
        }
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn player(&self) -> Option<&PlayerState> {
        self.player.as_ref()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn history(&self) -> Vec<String> {
        self.history.iter().cloned().collect()
    }

    /// Choices on offer; empty outside `Playing`.
    pub fn choices(&self) -> &[String] {
        match (&self.current, self.phase) {
            (Some(current), GamePhase::Playing) => current.choices.as_slice(),
            _ => &[],
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            player: self.player.clone(),
            phase: self.phase,
            messages: self.messages.clone(),
            choices: self.choices().to_vec(),
            game_over_reason: match self.phase {
                GamePhase::Finished => self
                    .current
                    .as_ref()
                    .and_then(|c| c.game_over_reason.clone()),
                _ => None,
            },
            last_error: self.last_error.clone(),
        }
    }

    /// Moves a fresh session to the character form.
    pub fn open_character_setup(&mut self) -> Result<(), ValidationError> {
        if !self.phase.accepts_setup() {
            return Err(ValidationError::AlreadyStarted(self.phase));
        }
        self.phase = GamePhase::AwaitingCharacterSetup;
        Ok(())
    }

    pub fn begin_start(
        &mut self,
        name: &str,
        theme: Theme,
    ) -> Result<PendingRequest, ValidationError> {
        if !self.phase.accepts_setup() {
            return Err(ValidationError::AlreadyStarted(self.phase));
        }
        let player = PlayerState::new(name, theme)?;

        info!(name = %player.name, theme = %player.theme, "starting session");

        self.player = Some(player.clone());
        self.last_error = None;
        let ticket = self.enter_awaiting(PendingKind::Setup);

        Ok(PendingRequest {
            ticket,
            request: NarrativeRequest::start(player),
        })
    }

    pub fn begin_action(&mut self, action: &str) -> Result<PendingRequest, ValidationError> {
        if self.phase != GamePhase::Playing {
            return Err(ValidationError::NotPlaying(self.phase));
        }
        let Some(player) = self.player.clone() else {
            return Err(ValidationError::NotPlaying(self.phase));
        };
        let action = action.trim();
        if action.is_empty() {
            return Err(ValidationError::EmptyAction);
        }

        // The backend sees the history as it stood before this action.
        let history = self.history();
        self.history.push_back(action.to_string());
        while self.history.len() > self.history_limit {
            self.history.pop_front();
        }

        let now = self.clock.now();
        self.messages.push(Message::new(Role::Player, action, now));
        self.last_error = None;
        let ticket = self.enter_awaiting(PendingKind::Turn);

        debug!(%action, history_len = history.len(), "submitting action");

        Ok(PendingRequest {
            ticket,
            request: NarrativeRequest::action(player, action.to_string(), history),
        })
    }

    /// Submits one of the offered choices by index.
    pub fn begin_choice(&mut self, index: usize) -> Result<PendingRequest, ValidationError> {
        if self.phase != GamePhase::Playing {
            return Err(ValidationError::NotPlaying(self.phase));
        }
        let choices = self.choices();
        let Some(choice) = choices.get(index).cloned() else {
            return Err(ValidationError::ChoiceOutOfRange {
                index,
                len: choices.len(),
            });
        };
        self.begin_action(&choice)
    }

    /// Applies the backend's answer for `ticket`.
    ///
    /// Failures revert the phase to where the request started (`NotStarted`
    /// for setup, `Playing` for a turn) and are returned to the caller; a turn
    /// failure leaves the player untouched.
    pub fn complete(
        &mut self,
        ticket: Ticket,
        result: Result<NarrativeResponse, RequestError>,
    ) -> Result<NarrativeResponse, SessionError> {
        let pending = match self.pending {
            Some(pending) if pending.ticket == ticket => pending,
            _ => return Err(ValidationError::StaleTicket.into()),
        };
        self.pending = None;

        match (pending.kind, result) {
            (PendingKind::Setup, Ok(response)) => {
                let now = self.clock.now();
                self.messages = vec![Message::new(Role::Narrator, response.narrative.clone(), now)];
                self.current = Some(response.clone());
                self.phase = GamePhase::Playing;
                Ok(response)
            }
            (PendingKind::Setup, Err(err)) => {
                warn!(error = %err, "failed to start session");
                self.player = None;
                self.phase = GamePhase::NotStarted;
                self.last_error = Some(format!("Failed to start game: {err}"));
                Err(err.into())
            }
            (PendingKind::Turn, Ok(response)) => {
                self.apply_turn(&response);
                Ok(response)
            }
            (PendingKind::Turn, Err(err)) => {
                warn!(error = %err, "turn request failed");
                let now = self.clock.now();
                self.messages.push(Message::new(
                    Role::System,
                    format!("The story could not continue: {err}"),
                    now,
                ));
                self.phase = GamePhase::Playing;
                self.last_error = Some(err.to_string());
                Err(err.into())
            }
        }
    }

    /// Creates the character and blocks on the opening scene.
    pub fn start_session(
        &mut self,
        service: &dyn NarrativeService,
        name: &str,
        theme: Theme,
    ) -> Result<NarrativeResponse, SessionError> {
        let pending = self.begin_start(name, theme)?;
        let result = service.generate(&pending.request);
        self.complete(pending.ticket, result)
    }

    /// Plays one turn, blocking on the backend.
    pub fn submit_action(
        &mut self,
        service: &dyn NarrativeService,
        action: &str,
    ) -> Result<NarrativeResponse, SessionError> {
        let pending = self.begin_action(action)?;
        let result = service.generate(&pending.request);
        self.complete(pending.ticket, result)
    }

    /// Discards everything and returns to `NotStarted`. Always succeeds.
    /// A response still in flight will be rejected as stale.
    pub fn reset_session(&mut self) {
        info!(phase = %self.phase, "resetting session");
        self.phase = GamePhase::NotStarted;
        self.player = None;
        self.messages.clear();
        self.history.clear();
        self.current = None;
        self.last_error = None;
        self.pending = None;
    }

    fn enter_awaiting(&mut self, kind: PendingKind) -> Ticket {
        self.next_ticket += 1;
        let ticket = Ticket(self.next_ticket);
        self.pending = Some(Pending { ticket, kind });
        self.phase = GamePhase::AwaitingResponse;
        ticket
    }

    fn apply_turn(&mut self, response: &NarrativeResponse) {
        let Some(player) = self.player.as_ref() else {
            return;
        };
        let outcome = resolve_turn(player, response);
        let now = self.clock.now();

        self.messages
            .push(Message::new(Role::Narrator, response.narrative.clone(), now));

        if outcome.leveled_up {
            info!(level = outcome.player.level, "level up");
            self.messages.push(Message::new(
                Role::System,
                format!("You reached level {}.", outcome.player.level),
                now,
            ));
        }

        if outcome.game_over {
            info!(
                health = outcome.player.health,
                reason = response.game_over_reason.as_deref().unwrap_or(""),
                "game over"
            );
            self.phase = GamePhase::Finished;
        } else {
            self.phase = GamePhase::Playing;
        }

        self.player = Some(outcome.player);
        self.current = Some(response.clone());
    }
}
