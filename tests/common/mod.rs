#![allow(dead_code)]

use async_trait::async_trait;
use csv_uploader::tracking::StatusResponse;
use csv_uploader::upload::{SelectedFile, UploadReply, WorkId};
use csv_uploader::{Error, Result, WorkApi};
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

pub const INTERVAL: Duration = Duration::from_millis(3000);

/// Slightly more than one interval, so the next tick is due but not the one after.
pub const ONE_TICK: Duration = Duration::from_millis(3010);

#[derive(Clone)]
pub enum UploadStep {
    Reply { status: u16, body: Value },
    Fail,
}

#[derive(Clone)]
pub enum StatusStep {
    Reply { body: Value, delay: Duration },
    Fail,
}

impl StatusStep {
    pub fn reply(body: Value) -> Self {
        StatusStep::Reply {
            body,
            delay: Duration::ZERO,
        }
    }

    pub fn delayed(body: Value, delay: Duration) -> Self {
        StatusStep::Reply { body, delay }
    }
}

/// Scripted server. The last status step for a work item repeats forever.
#[derive(Default)]
pub struct FakeApi {
    uploads: Mutex<VecDeque<UploadStep>>,
    statuses: Mutex<HashMap<String, VecDeque<StatusStep>>>,
    upload_calls: Mutex<Vec<String>>,
    status_calls: Mutex<Vec<String>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_upload(&self, step: UploadStep) {
        self.uploads.lock().unwrap().push_back(step);
    }

    pub fn script_status(&self, work_id: &str, steps: Vec<StatusStep>) {
        self.statuses
            .lock()
            .unwrap()
            .insert(work_id.to_string(), steps.into());
    }

    pub fn upload_calls(&self) -> Vec<String> {
        self.upload_calls.lock().unwrap().clone()
    }

    pub fn status_calls(&self) -> Vec<String> {
        self.status_calls.lock().unwrap().clone()
    }

    fn next_status(&self, work_id: &str) -> StatusStep {
        let mut statuses = self.statuses.lock().unwrap();
        let steps = statuses
            .get_mut(work_id)
            .unwrap_or_else(|| panic!("no status script for {work_id}"));
        if steps.len() > 1 {
            steps.pop_front().unwrap()
        } else {
            steps.front().cloned().unwrap()
        }
    }
}

fn refused() -> Error {
    Error::Io(std::io::Error::new(
        std::io::ErrorKind::ConnectionRefused,
        "connection refused",
    ))
}

#[async_trait]
impl WorkApi for FakeApi {
    async fn upload(&self, file: &SelectedFile) -> Result<UploadReply> {
        self.upload_calls.lock().unwrap().push(file.name.clone());
        let step = self
            .uploads
            .lock()
            .unwrap()
            .pop_front()
            .expect("unexpected upload");
        match step {
            UploadStep::Reply { status, body } => Ok(UploadReply {
                status,
                body: serde_json::from_value(body)?,
            }),
            UploadStep::Fail => Err(refused()),
        }
    }

    async fn status(&self, work_id: &WorkId) -> Result<StatusResponse> {
        self.status_calls
            .lock()
            .unwrap()
            .push(work_id.as_str().to_string());
        match self.next_status(work_id.as_str()) {
            StatusStep::Reply { body, delay } => {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                Ok(serde_json::from_value(body)?)
            }
            StatusStep::Fail => Err(refused()),
        }
    }
}

/// Let spawned tasks run without moving the paused clock.
pub async fn settle() {
    for _ in 0..50 {
        tokio::task::yield_now().await;
    }
}

pub async fn advance(duration: Duration) {
    tokio::time::advance(duration).await;
    settle().await;
}

pub async fn csv_file(dir: &Path, name: &str, content: &str) -> SelectedFile {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    SelectedFile::from_path(path, Some("text/csv".to_string()))
        .await
        .unwrap()
}
