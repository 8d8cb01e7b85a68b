use crate::engine::session::Ticket;
use crate::error::RequestError;
use crate::model::game_state::Theme;
use crate::model::narrative::NarrativeResponse;
use crate::model::snapshot::SessionSnapshot;

pub enum EngineCommand {
    OpenSetup,
    StartSession { name: String, theme: Theme },
    SubmitAction(String),
    SubmitChoice(usize),
    Reset,

    /// Sent by the request worker, not the UI.
    NarrativeReady {
        ticket: Ticket,
        result: Result<NarrativeResponse, RequestError>,
    },

    Shutdown,
}

#[derive(Debug, Clone)]
pub enum EngineResponse {
    Snapshot(SessionSnapshot),
    Rejected(String),
}
