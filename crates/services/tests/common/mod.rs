#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use challenge_core::model::{DocumentFilter, DocumentPage, RemoteDocument};
use reqwest::StatusCode;
use services::{DocumentSource, SyncError};
use tokio::sync::Notify;

/// One scripted response.
pub enum Step {
    Page(DocumentPage),
    Fail(StatusCode),
}

/// Arguments a `ScriptedSource` was called with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub token: String,
    pub filter: DocumentFilter,
    pub cursor: Option<String>,
}

/// Replays a fixed list of responses and records every request.
#[derive(Default)]
pub struct ScriptedSource {
    steps: Mutex<VecDeque<Step>>,
    calls: Mutex<Vec<Call>>,
    gate: Option<Gate>,
}

/// Lets a test hold the first request open until it calls `release`.
#[derive(Clone, Default)]
pub struct Gate {
    pub entered: Arc<Notify>,
    pub release: Arc<Notify>,
}

impl ScriptedSource {
    pub fn new(steps: impl IntoIterator<Item = Step>) -> Self {
        Self {
            steps: Mutex::new(steps.into_iter().collect()),
            calls: Mutex::new(Vec::new()),
            gate: None,
        }
    }

    pub fn gated(steps: impl IntoIterator<Item = Step>, gate: Gate) -> Self {
        Self {
            gate: Some(gate),
            ..Self::new(steps)
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl DocumentSource for ScriptedSource {
    async fn fetch_page(
        &self,
        token: &str,
        filter: &DocumentFilter,
        cursor: Option<&str>,
    ) -> Result<DocumentPage, SyncError> {
        self.calls.lock().unwrap().push(Call {
            token: token.to_string(),
            filter: filter.clone(),
            cursor: cursor.map(str::to_owned),
        });

        if let Some(gate) = &self.gate {
            gate.entered.notify_one();
            gate.release.notified().await;
        }

        let step = self
            .steps
            .lock()
            .unwrap()
            .pop_front()
            .expect("script ran out of pages");
        match step {
            Step::Page(page) => Ok(page),
            Step::Fail(status) => Err(SyncError::HttpStatus(status)),
        }
    }
}

pub fn page(tags: &[&[&str]], next: Option<&str>) -> Step {
    Step::Page(DocumentPage {
        results: tags
            .iter()
            .map(|doc_tags| RemoteDocument::with_tags(doc_tags.iter().copied()))
            .collect(),
        next_page_cursor: next.map(str::to_owned),
    })
}
