//! Drives a [`BuildPlan`] into the store.
//!
//! A build runs in three phases:
//!
//! 1. **Prepare.** Cancel per-object animations, read how many objects exist
//!    and switch their physics on so the old construction collapses.
//! 2. **Write.** Either one collection write for all objects plus one for all
//!    animations ([`BuildMode::Batch`]), or object by object with a cancellation
//!    check before each ([`BuildMode::Stepwise`]).
//! 3. **Finish.** Fit the floor around the new objects, move the cursor off any
//!    object about to disappear, and delete the surplus left by a larger
//!    previous build as one range.
//!
//! Only one build is live per orchestrator. Starting another cancels the
//! previous one at its next checkpoint, which comes before every object write
//! and every finish-phase write; writes it already issued stay.
//! Any failed write aborts the build and is returned as is, without retry.

use crate::cancel::{CancellationSource, CancellationToken};
use crate::config::SceneConfig;
use crate::cursor::{Cursor, CursorTarget};
use crate::error::SceneResult;
use crate::path::Segment;
use crate::plan::BuildPlan;
use crate::store::{SceneStore, collection_len, encode_body};
use bevy_math::Rect;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

/// How the write phase is executed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildMode {
    /// Two collection writes. Fast, no progress, no checkpoint between them.
    Batch,
    /// One object at a time, cancellable between objects.
    Stepwise,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BuildOptions {
    /// Move the cursor onto every object as it is written. Without this the
    /// cursor only lands on the first object.
    pub track_build: bool,
}

/// Outcome of one build run.
#[derive(Clone, Debug, PartialEq)]
pub struct BuildResult {
    /// Entries in the plan.
    pub planned: usize,
    /// Objects actually written.
    pub built: usize,
    /// Objects present before the build.
    pub previous_count: usize,
    /// Surplus objects deleted by the finish phase.
    pub removed: usize,
    /// The run was superseded or stopped. It wrote nothing after that point,
    /// so the finish phase is missing or incomplete.
    pub canceled: bool,
    /// Floor footprint written by the finish phase.
    pub floor: Option<Rect>,
}

/// Mutable state of one run. Never shared between runs.
struct BuildState {
    index: usize,
    previous_count: usize,
    token: CancellationToken,
}

impl BuildState {
    fn canceled(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// Builds plans against one object collection.
pub struct BuildOrchestrator {
    store: Arc<dyn SceneStore>,
    config: Arc<SceneConfig>,
    cursor: Cursor,
    current: Mutex<Option<CancellationSource>>,
}

impl BuildOrchestrator {
    pub fn new(store: Arc<dyn SceneStore>, config: Arc<SceneConfig>) -> Self {
        let cursor = Cursor::new(Arc::clone(&store), Arc::clone(&config));
        Self {
            store,
            config,
            cursor,
            current: Mutex::new(None),
        }
    }

    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    /// Cancels the live run, if any, and registers a fresh one.
    fn supersede(&self) -> CancellationToken {
        let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(previous) = current.take() {
            previous.cancel();
        }
        let source = CancellationSource::new();
        let token = source.token();
        *current = Some(source);
        token
    }

    /// Asks the live stepwise run to stop before its next object.
    pub fn stop_build(&self) {
        let current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(source) = current.as_ref() {
            source.cancel();
        }
    }

    /// Builds `plan`, superseding any run still in progress.
    pub async fn build(
        &self,
        plan: &BuildPlan,
        mode: BuildMode,
        options: BuildOptions,
    ) -> SceneResult<BuildResult> {
        let token = self.supersede();
        self.build_with_token(plan, mode, options, token).await
    }

    /// Builds `plan` under a caller-supplied token. Does not touch the
    /// orchestrator's own single-flight bookkeeping.
    pub async fn build_with_token(
        &self,
        plan: &BuildPlan,
        mode: BuildMode,
        options: BuildOptions,
        token: CancellationToken,
    ) -> SceneResult<BuildResult> {
        info!(planned = plan.len(), ?mode, "build started");

        self.stop_spinning().await?;
        let previous_count = self.drop_objects().await?;

        let mut state = BuildState {
            index: 0,
            previous_count,
            token,
        };

        match mode {
            BuildMode::Batch => self.write_batch(plan, &mut state).await?,
            BuildMode::Stepwise => self.write_stepwise(plan, options, &mut state).await?,
        }

        if state.index < plan.len() || state.canceled() {
            info!(built = state.index, planned = plan.len(), "build stopped");
            return Ok(BuildResult {
                planned: plan.len(),
                built: state.index,
                previous_count,
                removed: 0,
                canceled: true,
                floor: None,
            });
        }

        let (floor, removed) = self.finish(plan, &state).await?;
        let canceled = state.canceled();
        if canceled {
            info!(built = state.index, "build stopped while finishing");
        } else {
            info!(built = state.index, removed, "build finished");
        }
        Ok(BuildResult {
            planned: plan.len(),
            built: state.index,
            previous_count,
            removed,
            canceled,
            floor,
        })
    }

    async fn write_batch(&self, plan: &BuildPlan, state: &mut BuildState) -> SceneResult<()> {
        if !plan.is_empty() {
            let objects = &self.config.objects_path;
            let body = encode_body(objects, &plan.descriptors())?;
            self.store.patch(objects, body).await?;
        }
        let specs = plan.animation_specs();
        if !specs.is_empty() {
            let animations = &self.config.object_animations_path;
            let body = encode_body(animations, &specs)?;
            self.store.patch(animations, body).await?;
        }
        state.index = plan.len();
        Ok(())
    }

    async fn write_stepwise(
        &self,
        plan: &BuildPlan,
        options: BuildOptions,
        state: &mut BuildState,
    ) -> SceneResult<()> {
        for entry in plan {
            if state.canceled() {
                return Ok(());
            }
            let index = state.index;
            debug!(index, of = plan.len(), "building");

            let path = self.config.object_path(index);
            let body = encode_body(&path, &entry.descriptor)?;
            self.store.patch(&path, body).await?;

            if index == 0 || options.track_build {
                self.cursor.set_subject(CursorTarget::Object(index)).await?;
            }
            if let Some(animation) = &entry.animation {
                animation.slot.start(self.store.as_ref(), &animation.spec).await?;
            }
            state.index += 1;
        }
        Ok(())
    }

    /// Floor, cursor and surplus clean-up after a complete write phase. A run
    /// superseded in between stops before its next write: the surplus range
    /// may already hold the newer build's objects.
    async fn finish(&self, plan: &BuildPlan, state: &BuildState) -> SceneResult<(Option<Rect>, usize)> {
        let built = state.index;

        let floor = plan.footprint(self.config.floor_margin);
        if let Some(rect) = floor {
            let (size, center) = (rect.size(), rect.center());
            self.store
                .patch(
                    &self.config.floor_path,
                    json!({
                        "worldScale": [size.x, size.y],
                        "worldPosition": [center.x, center.y],
                    }),
                )
                .await?;
        }

        if state.canceled() {
            return Ok((floor, 0));
        }
        match self.cursor.subject().await {
            Ok(CursorTarget::Object(i)) if i >= built => {
                let target = self.cursor.jump_within(built as i64 - 1, built).await?;
                debug!(from = i, to = %target, "cursor moved off surplus object");
            }
            Ok(_) => {}
            Err(err) => warn!(error = %err, "cursor subject unreadable, leaving it"),
        }

        let mut removed = 0;
        if state.previous_count > built && !state.canceled() {
            let surplus = self
                .config
                .objects_path
                .child(Segment::range(built, state.previous_count));
            self.store.delete(&surplus).await?;
            removed = state.previous_count - built;
        }
        Ok((floor, removed))
    }

    /// Cancels every per-object animation.
    pub async fn stop_spinning(&self) -> SceneResult<()> {
        self.store.delete(&self.config.object_animations_path).await?;
        Ok(())
    }

    /// Switches physics on for every existing object and returns how many
    /// there were. An unreadable collection counts as empty.
    pub async fn drop_objects(&self) -> SceneResult<usize> {
        let count = collection_len(self.store.as_ref(), &self.config.objects_path).await;
        if count > 0 {
            let physics = self.config.objects_path.child(Segment::ALL).child("physics");
            self.store.put(&physics, json!(true)).await?;
        }
        Ok(count)
    }

    /// Stops any build and animation, resets the floor and cursor, and
    /// deletes every object.
    pub async fn clear(&self) -> SceneResult<()> {
        self.stop_build();
        self.stop_spinning().await?;
        let scale = self.config.floor_default_scale;
        let position = self.config.floor_default_position;
        self.store
            .patch(
                &self.config.floor_path,
                json!({
                    "worldScale": [scale.x, scale.y],
                    "worldPosition": [position.x, position.y],
                }),
            )
            .await?;
        self.cursor.set_subject(CursorTarget::Floor).await?;
        self.store
            .delete(&self.config.objects_path.child(Segment::ALL))
            .await?;
        info!("scene cleared");
        Ok(())
    }
}
