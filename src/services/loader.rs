use crate::services::api::{dispatch, ApiCall, ApiReply, ViewerApi};
use crate::services::http_client::RequestError;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread;

pub type SharedApi = Arc<dyn ViewerApi + Send + Sync>;

/// Completion of a background call, delivered to the UI loop.
#[derive(Debug)]
pub enum LoadMsg {
    Finished {
        call: ApiCall,
        outcome: Result<ApiReply, RequestError>,
    },
    /// The worker panicked before producing an outcome.
    Crashed { call: ApiCall, reason: String },
}

pub fn spawn_call(api: SharedApi, call: ApiCall, tx: Sender<LoadMsg>) {
    thread::spawn(move || {
        let msg = run_call(api.as_ref(), call);
        let _ = tx.send(msg);
    });
}

pub(crate) fn run_call(api: &(dyn ViewerApi + Send + Sync), call: ApiCall) -> LoadMsg {
    match panic::catch_unwind(AssertUnwindSafe(|| dispatch(api, &call))) {
        Ok(outcome) => LoadMsg::Finished { call, outcome },
        Err(payload) => LoadMsg::Crashed {
            call,
            reason: panic_message(payload.as_ref()),
        },
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "worker panicked".to_string()
    }
}

#[cfg(test)]
mod loader_tests;
