#![allow(dead_code)]

use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use serde_json::{json, Value};
use storyreel_core::persistence::{PersistenceError, ProjectPersistence};
use storyreel_core::project::{NewProject, Project, ProjectPatch, StoryAnalysis};
use storyreel_core::types::ProjectId;
use storyreel_genai::{GenerationBackend, GenerationError, ImagePrompt};
use storyreel_store::MemoryRemote;

pub const OWNER: &str = "owner-1";

/// A stored project with a fixed creation time, `minute` minutes past noon.
pub fn seeded(id: &str, owner_id: &str, title: &str, minute: u32) -> Project {
    let created_at = Utc.with_ymd_and_hms(2024, 6, 1, 12, minute, 0).unwrap();
    NewProject::new(title, "Once upon a time.").into_project(
        id.to_string(),
        owner_id.to_string(),
        created_at,
    )
}

pub fn sample_analysis() -> StoryAnalysis {
    StoryAnalysis {
        themes: vec!["solitude".into()],
        characters: vec!["Keeper".into()],
        structure: "Linear".into(),
        summary: "A keeper tends a light.".into(),
    }
}

/// Poll `condition` until it holds, yielding to other tasks in between.
pub async fn wait_until(condition: impl Fn() -> bool) {
    for _ in 0..200 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("condition was not met in time");
}

// ---------------------------------------------------------------------------
// Failure-injecting remote
// ---------------------------------------------------------------------------

/// Wraps a [`MemoryRemote`] and fails operations on demand.
///
/// Update outcomes are scripted per call; the gate lets a test hold every
/// remote update in flight until it is released.
#[derive(Default)]
pub struct FlakyRemote {
    pub inner: MemoryRemote,
    pub fail_list: AtomicBool,
    pub fail_get: AtomicBool,
    pub fail_create: AtomicBool,
    pub fail_delete: AtomicBool,
    update_script: Mutex<VecDeque<bool>>,
    pub gate: tokio::sync::Mutex<()>,
    pub create_calls: AtomicUsize,
    pub update_calls: AtomicUsize,
    pub delete_calls: AtomicUsize,
}

impl FlakyRemote {
    pub fn with_projects(projects: Vec<Project>) -> Self {
        Self {
            inner: MemoryRemote::with_projects(projects),
            ..Self::default()
        }
    }

    /// Queue update outcomes: `true` fails that call. Unscripted calls
    /// succeed.
    pub fn script_updates(&self, failures: &[bool]) {
        self.update_script.lock().unwrap().extend(failures);
    }

    pub fn set(flag: &AtomicBool, value: bool) {
        flag.store(value, Ordering::SeqCst);
    }

    pub fn calls(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }

    pub async fn stored(&self, id: &str) -> Option<Project> {
        self.inner.get_by_id(id).await.unwrap()
    }
}

fn injected() -> PersistenceError {
    PersistenceError::Backend("injected failure".into())
}

#[async_trait]
impl ProjectPersistence for FlakyRemote {
    async fn create(
        &self,
        owner_id: &str,
        data: &NewProject,
    ) -> Result<ProjectId, PersistenceError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(injected());
        }
        self.inner.create(owner_id, data).await
    }

    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<Project>, PersistenceError> {
        if self.fail_list.load(Ordering::SeqCst) {
            return Err(injected());
        }
        self.inner.list_by_owner(owner_id).await
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Project>, PersistenceError> {
        if self.fail_get.load(Ordering::SeqCst) {
            return Err(injected());
        }
        self.inner.get_by_id(id).await
    }

    async fn update(&self, id: &str, patch: &ProjectPatch) -> Result<(), PersistenceError> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        let fail = self.update_script.lock().unwrap().pop_front().unwrap_or(false);
        let _gate = self.gate.lock().await;
        if fail {
            return Err(injected());
        }
        self.inner.update(id, patch).await
    }

    async fn delete(&self, id: &str) -> Result<(), PersistenceError> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        let _gate = self.gate.lock().await;
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(injected());
        }
        self.inner.delete(id).await
    }
}

// ---------------------------------------------------------------------------
// Stub generator
// ---------------------------------------------------------------------------

/// Answers analysis and storyboard prompts with canned JSON and renders
/// images as numbered URLs.
///
/// Holding `image_gate` parks every render after it has been counted.
pub struct StubGenerator {
    pub analysis: Option<Value>,
    pub storyboard: Value,
    pub failing_subjects: HashSet<String>,
    pub structured_calls: AtomicUsize,
    pub image_calls: AtomicUsize,
    pub image_gate: tokio::sync::Mutex<()>,
    pub prompts: Mutex<Vec<String>>,
}

impl Default for StubGenerator {
    fn default() -> Self {
        Self {
            analysis: Some(json!({
                "themes": ["solitude", "duty"],
                "characters": ["Keeper", "Ship captain"],
                "structure": "Storm, rescue, dawn.",
                "summary": "A keeper guides a ship through a storm."
            })),
            storyboard: json!([
                "A lighthouse on a cliff at dusk",
                "The keeper climbs the spiral stairs",
                "A ship breaks through the waves at dawn"
            ]),
            failing_subjects: HashSet::new(),
            structured_calls: AtomicUsize::new(0),
            image_calls: AtomicUsize::new(0),
            image_gate: tokio::sync::Mutex::new(()),
            prompts: Mutex::new(Vec::new()),
        }
    }
}

impl StubGenerator {
    pub fn failing(mut self, subject: &str) -> Self {
        self.failing_subjects.insert(subject.to_string());
        self
    }

    pub fn without_analysis(mut self) -> Self {
        self.analysis = None;
        self
    }
}

#[async_trait]
impl GenerationBackend for StubGenerator {
    async fn generate_structured(&self, prompt: &str) -> Result<Option<Value>, GenerationError> {
        self.structured_calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());
        if prompt.starts_with("You are a literary expert") {
            Ok(self.analysis.clone())
        } else {
            Ok(Some(self.storyboard.clone()))
        }
    }

    async fn generate_image(&self, prompt: &ImagePrompt) -> Result<Option<String>, GenerationError> {
        let n = self.image_calls.fetch_add(1, Ordering::SeqCst) + 1;
        let _gate = self.image_gate.lock().await;
        if self.failing_subjects.contains(&prompt.subject) {
            return Err(GenerationError::Api {
                status: 500,
                body: "render failed".into(),
            });
        }
        Ok(Some(format!("https://img.test/{n}.png")))
    }
}
