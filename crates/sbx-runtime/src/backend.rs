#![forbid(unsafe_code)]

//! The update dispatcher.
//!
//! [`Backend`] owns every loaded [`Handle`] and the collaborators they
//! share. Each public method is one host command: it resolves the target
//! node through the handle's scene graph, drives the toolkit, and keeps the
//! graph in step with what the toolkit created or destroyed.
//!
//! # Failure policy
//!
//! Lookups fail before anything is touched. Past that point there is no
//! rollback: an image update clears the part before decoding, so a failed
//! decode leaves the part empty.

use std::path::Path;

use rustc_hash::FxHashMap;
use sbx_core::event::{self, BackendEvent, EventInfo};
use sbx_core::{ColorClass, EventStatus, Result, SbxError, Size};
use sbx_layout::{
    Fill, ImageCrateLoader, ImageLoader, LayoutPlan, bake, is_readable, parse_options, plan,
};
use sbx_scene::{NodeId, ObjectRef, SceneGraph};

use crate::buffer::BufferGuard;
use crate::config::{BackendConfig, ConfigError};
use crate::event_feed::{StalenessFilter, access_status, key_status};
use crate::handle::{Handle, HandleId};
use crate::ids::SyntheticIds;
use crate::toolkit::{
    Clock, ImageNode, NoShadow, PixelBuffer, ShadowEffect, SystemClock, Toolkit, ToolkitError,
};

/// Dispatcher for every loaded script instance.
pub struct Backend<T: Toolkit> {
    toolkit: T,
    loader: Box<dyn ImageLoader>,
    shadow: Box<dyn ShadowEffect>,
    clock: Box<dyn Clock>,
    config: BackendConfig,
    handles: FxHashMap<HandleId, Handle>,
    next_handle: u32,
    ids: SyntheticIds,
}

impl<T: Toolkit> Backend<T> {
    /// Backend with the `image`-crate loader, no shadow capability and the
    /// system clock.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Validation`] when `config` is out of range.
    pub fn new(toolkit: T, config: BackendConfig) -> std::result::Result<Self, ConfigError> {
        let config = config.validated()?;
        tracing::debug!(
            target: "sbx.dispatch",
            ui_scale = config.ui_scale,
            stale_event_window_ms = config.stale_event_window_ms,
            shadow_enabled = config.shadow_enabled,
            "backend created"
        );
        Ok(Self {
            toolkit,
            loader: Box::new(ImageCrateLoader),
            shadow: Box::new(NoShadow),
            clock: Box::new(SystemClock),
            config,
            handles: FxHashMap::default(),
            next_handle: 1,
            ids: SyntheticIds::new(),
        })
    }

    #[must_use]
    pub fn with_loader(mut self, loader: impl ImageLoader + 'static) -> Self {
        self.loader = Box::new(loader);
        self
    }

    #[must_use]
    pub fn with_shadow(mut self, shadow: impl ShadowEffect + 'static) -> Self {
        self.shadow = Box::new(shadow);
        self
    }

    #[must_use]
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    #[must_use]
    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    #[must_use]
    pub fn toolkit(&self) -> &T {
        &self.toolkit
    }

    pub fn toolkit_mut(&mut self) -> &mut T {
        &mut self.toolkit
    }

    #[must_use]
    pub fn handle(&self, handle: HandleId) -> Option<&Handle> {
        self.handles.get(&handle)
    }

    /// Number of loaded handles.
    #[must_use]
    pub fn handle_count(&self) -> usize {
        self.handles.len()
    }

    // ── Handle lifecycle ────────────────────────────────────────────────

    /// Load the root layout `group` of `file` into a new handle backed by
    /// `buffer`.
    pub fn create(
        &mut self,
        file: impl AsRef<Path>,
        group: &str,
        buffer: Box<dyn PixelBuffer>,
    ) -> Result<HandleId> {
        let file = file.as_ref();
        let _span = tracing::debug_span!("sbx.update", op = "create", file = %file.display())
            .entered();

        let id = HandleId::from_raw(self.next_handle);
        let next = self
            .next_handle
            .checked_add(1)
            .ok_or_else(|| SbxError::fault("handle ids exhausted"))?;

        if !is_readable(file) {
            return Err(SbxError::io(
                file.display().to_string(),
                "layout file is not readable",
            ));
        }
        let root = self
            .toolkit
            .load_layout(file, group)
            .map_err(|err| load_error(file, err))?;

        let size = buffer.size();
        if !size.is_empty() {
            self.toolkit.resize(root, size);
        }

        let mut graph = SceneGraph::new();
        graph.attach(root, None, None)?;

        self.next_handle = next;
        self.handles.insert(
            id,
            Handle {
                file: file.to_path_buf(),
                group: group.to_string(),
                category: None,
                graph,
                buffer,
                input: StalenessFilter::new(self.config.stale_event_window()),
            },
        );
        tracing::info!(target: "sbx.dispatch", handle = %id, group, "handle created");
        Ok(id)
    }

    /// Delete the root layout (cascading through every sub-layout) and
    /// free the handle.
    pub fn destroy(&mut self, handle: HandleId) -> Result<()> {
        let _span = tracing::debug_span!("sbx.update", op = "destroy", handle = %handle).entered();

        let mut entry = self
            .handles
            .remove(&handle)
            .ok_or(SbxError::HandleNotFound {
                handle: handle.raw(),
            })?;

        if let Some(root) = entry.root().and_then(|node| entry.graph.object(node)) {
            for object in self.toolkit.delete(root) {
                entry.graph.request_destroy(object);
            }
        }

        let leaked = entry.graph.clear();
        if leaked > 0 {
            tracing::warn!(
                target: "sbx.dispatch",
                handle = %handle,
                leaked,
                "toolkit did not report every destruction; records discarded"
            );
        }
        tracing::info!(target: "sbx.dispatch", handle = %handle, "handle destroyed");
        Ok(())
    }

    /// Forward a toolkit object-destroyed notification.
    pub fn object_destroyed(&mut self, handle: HandleId, object: ObjectRef) -> Result<()> {
        let entry = lookup(&mut self.handles, handle)?;
        if entry.graph.request_destroy(object).is_none() {
            tracing::trace!(
                target: "sbx.dispatch",
                handle = %handle,
                %object,
                "destroy notification for untracked object"
            );
        }
        Ok(())
    }

    // ── Content updates ─────────────────────────────────────────────────

    /// Set the text of `part` and mirror it as the part's accessibility
    /// description. Empty text removes the description.
    pub fn update_text(
        &mut self,
        handle: HandleId,
        id: Option<&str>,
        part: &str,
        text: &str,
    ) -> Result<()> {
        let _span =
            tracing::debug_span!("sbx.update", op = "update_text", handle = %handle, part)
                .entered();

        let entry = lookup(&mut self.handles, handle)?;
        let (_, object) = resolve(&entry.graph, id)?;

        self.toolkit.part_text_set(object, part, text);
        let description = (!text.is_empty()).then_some(text);
        self.toolkit
            .set_access_description(object, part, description);
        Ok(())
    }

    /// Replace the image shown in `part`.
    ///
    /// The old content is always removed first. An empty or unreadable
    /// `path` leaves the part empty and succeeds.
    pub fn update_image(
        &mut self,
        handle: HandleId,
        id: Option<&str>,
        part: &str,
        path: &str,
        option: Option<&str>,
    ) -> Result<()> {
        let _span =
            tracing::debug_span!("sbx.update", op = "update_image", handle = %handle, part, path)
                .entered();

        let Self {
            toolkit,
            loader,
            shadow,
            config,
            handles,
            ..
        } = self;
        let entry = lookup(handles, handle)?;
        let (_, object) = resolve(&entry.graph, id)?;

        clear_part(toolkit, &mut entry.graph, object, part);

        if path.is_empty() {
            tracing::debug!(target: "sbx.dispatch", part, "image cleared");
            return Ok(());
        }
        let path = Path::new(path);
        if !is_readable(path) {
            tracing::debug!(
                target: "sbx.dispatch",
                part,
                path = %path.display(),
                "image path unreadable; part left empty"
            );
            return Ok(());
        }

        let options = parse_options(option);
        let decoded = loader.decode(path, options.orient)?;
        let explicit = options.scaled_size(config.ui_scale);
        let part_size = if explicit.is_none() && options.aspect && options.fill != Fill::Disable {
            toolkit.part_geometry(object, part)
        } else {
            None
        };

        let node = match plan(decoded.size(), explicit, part_size, &options)? {
            LayoutPlan::Stretch(size) => ImageNode::Scaled {
                pixels: decoded.into_pixels(),
                size,
                keep_aspect: false,
            },
            LayoutPlan::AspectHint(size) => ImageNode::Scaled {
                pixels: decoded.into_pixels(),
                size,
                keep_aspect: true,
            },
            LayoutPlan::Snapshot(crop) => ImageNode::Snapshot {
                pixels: bake(decoded.pixels(), &crop)?,
            },
        };
        let size = node.size();
        let content = toolkit.create_image(node)?;

        if options.shadow.enabled && config.shadow_enabled && !shadow.apply(content, &options.shadow)
        {
            tracing::debug!(target: "sbx.dispatch", part, "shadow capability unavailable; skipped");
        }

        if let Err(err) = toolkit.part_swallow(object, part, content) {
            toolkit.delete(content);
            return Err(err.into());
        }
        tracing::debug!(
            target: "sbx.dispatch",
            part,
            width = size.width,
            height = size.height,
            "image swallowed"
        );
        Ok(())
    }

    /// Replace the sub-layout swallowed into `part` of `src_id`.
    ///
    /// The new node is registered as `target_id`; without one it takes the
    /// part name, or a synthetic id when that name is already in use.
    pub fn update_script(
        &mut self,
        handle: HandleId,
        src_id: Option<&str>,
        target_id: Option<&str>,
        part: &str,
        path: &str,
        group: &str,
    ) -> Result<()> {
        let _span = tracing::debug_span!(
            "sbx.update",
            op = "update_script",
            handle = %handle,
            part,
            path,
            group
        )
        .entered();

        let Self {
            toolkit,
            clock,
            handles,
            ids,
            ..
        } = self;
        let entry = lookup(handles, handle)?;
        let (parent, object) = resolve(&entry.graph, src_id)?;

        clear_part(toolkit, &mut entry.graph, object, part);

        if path.is_empty() {
            tracing::debug!(target: "sbx.dispatch", part, "sub-layout cleared");
            return Ok(());
        }
        let path = Path::new(path);
        if !is_readable(path) {
            return Err(SbxError::io(
                path.display().to_string(),
                "layout file is not readable",
            ));
        }

        let child = toolkit
            .load_layout(path, group)
            .map_err(|err| load_error(path, err))?;

        let registry = entry.graph.registry();
        let id = match target_id.filter(|id| !id.is_empty()) {
            Some(id) => id.to_string(),
            None if registry.contains_id(part) => {
                ids.unique(&**clock, |candidate| registry.contains_id(candidate))
            }
            None => part.to_string(),
        };

        if let Err(err) = entry.graph.attach(child, Some(&id), Some((parent, part))) {
            toolkit.delete(child);
            return Err(err.into());
        }
        if let Err(err) = toolkit.part_swallow(object, part, child) {
            for destroyed in toolkit.delete(child) {
                entry.graph.request_destroy(destroyed);
            }
            return Err(err.into());
        }
        tracing::debug!(target: "sbx.dispatch", part, id = %id, "sub-layout attached");
        Ok(())
    }

    /// Emit `signal` with `part` as its source.
    pub fn update_signal(
        &mut self,
        handle: HandleId,
        id: Option<&str>,
        part: &str,
        signal: &str,
    ) -> Result<()> {
        let _span =
            tracing::debug_span!("sbx.update", op = "update_signal", handle = %handle, signal)
                .entered();

        let entry = lookup(&mut self.handles, handle)?;
        let (_, object) = resolve(&entry.graph, id)?;
        self.toolkit.signal_emit(object, signal, part);
        Ok(())
    }

    pub fn update_drag(
        &mut self,
        handle: HandleId,
        id: Option<&str>,
        part: &str,
        x: f64,
        y: f64,
    ) -> Result<()> {
        let _span =
            tracing::debug_span!("sbx.update", op = "update_drag", handle = %handle, part)
                .entered();

        let entry = lookup(&mut self.handles, handle)?;
        let (_, object) = resolve(&entry.graph, id)?;
        self.toolkit.part_drag_value_set(object, part, x, y);
        Ok(())
    }

    /// Resize a node. Resizing the root also resizes the backing buffer.
    pub fn update_size(
        &mut self,
        handle: HandleId,
        id: Option<&str>,
        width: u32,
        height: u32,
    ) -> Result<()> {
        let _span = tracing::debug_span!(
            "sbx.update",
            op = "update_size",
            handle = %handle,
            width,
            height
        )
        .entered();

        let entry = lookup(&mut self.handles, handle)?;
        let (_, object) = resolve(&entry.graph, id)?;
        let size = Size::new(width, height);

        self.toolkit.resize(object, size);
        if id.is_none() {
            entry.buffer.resize(size);
        }
        Ok(())
    }

    /// Replace the handle's category.
    pub fn update_category(
        &mut self,
        handle: HandleId,
        id: Option<&str>,
        category: Option<&str>,
    ) -> Result<()> {
        let _span = tracing::debug_span!(
            "sbx.update",
            op = "update_category",
            handle = %handle,
            id = ?id
        )
        .entered();

        let entry = lookup(&mut self.handles, handle)?;
        entry.category = match category {
            Some(category) => {
                let mut stored = String::new();
                stored
                    .try_reserve_exact(category.len())
                    .map_err(|_| SbxError::oom("category"))?;
                stored.push_str(category);
                Some(stored)
            }
            None => None,
        };
        Ok(())
    }

    /// Apply a twelve-integer color class to a node.
    pub fn update_color(
        &mut self,
        handle: HandleId,
        id: Option<&str>,
        class: &str,
        value: &str,
    ) -> Result<()> {
        let _span =
            tracing::debug_span!("sbx.update", op = "update_color", handle = %handle, class)
                .entered();

        let entry = lookup(&mut self.handles, handle)?;
        let (_, object) = resolve(&entry.graph, id)?;
        let colors: ColorClass = value
            .parse()
            .map_err(|err| SbxError::invalid(format!("color class {class:?}: {err}")))?;
        self.toolkit.set_color_class(object, class, &colors);
        Ok(())
    }

    // ── Input ───────────────────────────────────────────────────────────

    /// Decode a raw event code and deliver it to the root layout.
    pub fn feed_event(
        &mut self,
        handle: HandleId,
        raw: u32,
        info: &EventInfo,
    ) -> Result<EventStatus> {
        let _span =
            tracing::debug_span!("sbx.event", handle = %handle, raw)
                .entered();

        let Self {
            toolkit,
            clock,
            handles,
            ..
        } = self;
        let entry = lookup(handles, handle)?;
        let (_, root) = resolve(&entry.graph, None)?;
        let decoded = event::decode(raw, info.action_type)
            .map_err(|err| SbxError::invalid(err.to_string()))?;

        let status = match decoded {
            BackendEvent::Access(action) => {
                let handled = toolkit.access_action(root, action, info.x, info.y);
                access_status(action, handled)
            }
            BackendEvent::Mouse(action) => {
                if entry.input.admit(action, info.timestamp, clock.now()) {
                    toolkit.feed_mouse(root, action, info.x, info.y, info.timestamp);
                }
                EventStatus::Done
            }
            BackendEvent::Key(action) => key_status(toolkit.feed_key(root, action, info.key_code)),
        };
        tracing::trace!(target: "sbx.event", event = ?decoded, status = ?status, "event fed");
        Ok(status)
    }

    // ── Rendering ───────────────────────────────────────────────────────

    /// Paint the root layout into the handle's buffer.
    pub fn render(&mut self, handle: HandleId) -> Result<()> {
        let _span = tracing::debug_span!("sbx.update", op = "render", handle = %handle).entered();

        let entry = lookup(&mut self.handles, handle)?;
        let (_, root) = resolve(&entry.graph, None)?;
        let mut guard = BufferGuard::acquire(&mut *entry.buffer)?;
        let size = guard.size();
        self.toolkit.paint(root, guard.pixels_mut(), size)?;
        Ok(())
    }
}

impl<T: Toolkit + std::fmt::Debug> std::fmt::Debug for Backend<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Backend")
            .field("toolkit", &self.toolkit)
            .field("config", &self.config)
            .field("handles", &self.handles.len())
            .finish_non_exhaustive()
    }
}

fn lookup(handles: &mut FxHashMap<HandleId, Handle>, handle: HandleId) -> Result<&mut Handle> {
    handles.get_mut(&handle).ok_or(SbxError::HandleNotFound {
        handle: handle.raw(),
    })
}

fn resolve(graph: &SceneGraph, id: Option<&str>) -> Result<(NodeId, ObjectRef)> {
    graph
        .find(id)
        .and_then(|node| Some((node, graph.object(node)?)))
        .ok_or_else(|| SbxError::not_found(id))
}

/// Unswallow and delete whatever sits in `part`, feeding every destroyed
/// object back to the graph.
fn clear_part<T: Toolkit>(toolkit: &mut T, graph: &mut SceneGraph, container: ObjectRef, part: &str) {
    let Some(old) = toolkit.part_unswallow(container, part) else {
        return;
    };
    let destroyed = toolkit.delete(old);
    tracing::trace!(
        target: "sbx.dispatch",
        part,
        %old,
        destroyed = destroyed.len(),
        "old content removed"
    );
    for object in destroyed {
        graph.request_destroy(object);
    }
}

fn load_error(path: &Path, err: ToolkitError) -> SbxError {
    match err {
        ToolkitError::Load { message } => SbxError::io(path.display().to_string(), message),
        other => other.into(),
    }
}
