//! Exception collector: captured errors with source context.
//!
//! Records are built eagerly. The source file is read and the traces are
//! formatted inside [`ExceptionsCollector::capture`], so later edits to the
//! file do not change what was captured.

use crate::collector::link::{DebugLinkBuilder, EditorLink};
use crate::collector::source_excerpt::{read_excerpt, unreadable_placeholder};
use crate::collector::{DataCollector, Throwable};
use crate::config::ResolvedConfig;
use crate::format::{Asset, RichValueRenderer};
use crate::model::{CollectError, ExceptionRecord, Frame, Value};
use serde::Serialize;
use tracing::{debug, warn};

/// Default bound on records produced by one chain-unrolled capture.
pub const DEFAULT_MAX_CHAIN_DEPTH: usize = 16;

/// Transform applied to structured frames before rich rendering.
pub type FrameFilter = Box<dyn Fn(Vec<Frame>) -> Vec<Frame>>;

/// Payload handed to the rendering layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExceptionsPayload {
    /// Number of records in `exceptions`.
    pub count: usize,
    /// Captured records, in capture order.
    pub exceptions: Vec<ExceptionRecord>,
}

// ===== Builder =====

/// Builder for [`ExceptionsCollector`].
pub struct ExceptionsCollectorBuilder {
    name: String,
    renderer: Option<Box<dyn RichValueRenderer>>,
    chain_unroll: bool,
    max_chain_depth: usize,
    link_builder: Option<Box<dyn DebugLinkBuilder>>,
    frame_filter: Option<FrameFilter>,
}

impl ExceptionsCollectorBuilder {
    /// Renderer used for rich stack traces.
    pub fn rich_renderer(mut self, renderer: impl RichValueRenderer + 'static) -> Self {
        self.renderer = Some(Box::new(renderer));
        self
    }

    /// Also capture each error's cause chain, outer error first.
    pub fn chain_unroll(mut self, enabled: bool) -> Self {
        self.chain_unroll = enabled;
        self
    }

    /// Upper bound on records per capture when unrolling. At least one.
    pub fn max_chain_depth(mut self, depth: usize) -> Self {
        self.max_chain_depth = depth.max(1);
        self
    }

    /// Attach an external debug link to every record.
    pub fn debug_links(mut self, builder: impl DebugLinkBuilder + 'static) -> Self {
        self.link_builder = Some(Box::new(builder));
        self
    }

    /// Scrub or reshape frames before they reach the rich renderer.
    pub fn frame_filter(mut self, filter: impl Fn(Vec<Frame>) -> Vec<Frame> + 'static) -> Self {
        self.frame_filter = Some(Box::new(filter));
        self
    }

    /// Finish building. Settings are fixed from here on.
    pub fn build(self) -> ExceptionsCollector {
        ExceptionsCollector {
            name: self.name,
            renderer: self.renderer,
            chain_unroll: self.chain_unroll,
            max_chain_depth: self.max_chain_depth,
            link_builder: self.link_builder,
            frame_filter: self.frame_filter,
            captured: Vec::new(),
        }
    }
}

// ===== ExceptionsCollector =====

/// Collects captured errors for one request, in capture order.
pub struct ExceptionsCollector {
    name: String,
    renderer: Option<Box<dyn RichValueRenderer>>,
    chain_unroll: bool,
    max_chain_depth: usize,
    link_builder: Option<Box<dyn DebugLinkBuilder>>,
    frame_filter: Option<FrameFilter>,
    captured: Vec<ExceptionRecord>,
}

impl ExceptionsCollector {
    /// Start building a collector: no renderer, no chain unrolling, no links.
    pub fn builder(name: impl Into<String>) -> ExceptionsCollectorBuilder {
        ExceptionsCollectorBuilder {
            name: name.into(),
            renderer: None,
            chain_unroll: false,
            max_chain_depth: DEFAULT_MAX_CHAIN_DEPTH,
            link_builder: None,
            frame_filter: None,
        }
    }

    /// Collector with every option at its default.
    pub fn new(name: impl Into<String>) -> Self {
        Self::builder(name).build()
    }

    /// Builder preconfigured from resolved settings: name, chain unrolling, and
    /// editor links (longest path-mapping prefix first).
    pub fn from_config(config: &ResolvedConfig) -> ExceptionsCollectorBuilder {
        let mut builder = Self::builder(config.exceptions_name.clone())
            .chain_unroll(config.chain_unroll)
            .max_chain_depth(config.max_chain_depth);

        if let Some(template) = &config.editor_link {
            let mut mappings: Vec<(&String, &String)> = config.path_mappings.iter().collect();
            mappings.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
            let link = mappings
                .into_iter()
                .fold(EditorLink::new(template.clone()), |link, (from, to)| {
                    link.with_path_mapping(from.clone(), to.clone())
                });
            builder = builder.debug_links(link);
        }

        builder
    }

    /// Name this collector publishes under.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// True when a rich renderer is configured.
    pub fn is_rich(&self) -> bool {
        self.renderer.is_some()
    }

    /// True when causes are captured as records of their own.
    pub fn chain_unroll_enabled(&self) -> bool {
        self.chain_unroll
    }

    /// Capture `error`, plus its causes when chain unrolling is on.
    ///
    /// Returns the number of records added. With `rich_trace` the structured
    /// frames are rendered through the rich renderer, which must be configured.
    /// Either every record of the chain is stored or, on failure, none is.
    pub fn capture(&mut self, error: &dyn Throwable, rich_trace: bool) -> Result<usize, CollectError> {
        if rich_trace && self.renderer.is_none() {
            return Err(CollectError::RichRenderingUnavailable {
                collector: self.name.clone(),
            });
        }

        let mut pending = Vec::new();
        let mut seen: Vec<*const ()> = Vec::new();
        let mut current = Some(error);

        while let Some(err) = current {
            let addr = std::ptr::from_ref(err).cast::<()>();
            if seen.contains(&addr) {
                warn!(collector = %self.name, kind = err.kind(), "cause chain loops back, stopping");
                break;
            }
            if pending.len() >= self.max_chain_depth {
                warn!(
                    collector = %self.name,
                    max = self.max_chain_depth,
                    "cause chain deeper than limit, truncating"
                );
                break;
            }
            seen.push(addr);
            pending.push(self.build_record(err, rich_trace)?);
            current = if self.chain_unroll { err.cause() } else { None };
        }

        let added = pending.len();
        debug!(collector = %self.name, added, "exception captured");
        self.captured.extend(pending);
        Ok(added)
    }

    /// Capture with rich traces whenever a renderer is configured.
    pub fn add(&mut self, error: &dyn Throwable) -> Result<usize, CollectError> {
        let rich = self.is_rich();
        self.capture(error, rich)
    }

    /// Captured records, in capture order.
    pub fn exceptions(&self) -> &[ExceptionRecord] {
        &self.captured
    }

    /// Count and records, ready for the rendering layer.
    pub fn payload(&self) -> ExceptionsPayload {
        ExceptionsPayload {
            count: self.captured.len(),
            exceptions: self.captured.clone(),
        }
    }

    fn build_record(&self, err: &dyn Throwable, rich_trace: bool) -> Result<ExceptionRecord, CollectError> {
        let file = err.file();
        let line = err.line();

        let (surrounding_lines, surrounding_start_line) = match read_excerpt(file, line) {
            Ok(excerpt) => (excerpt.lines, Some(excerpt.start_line)),
            Err(e) => {
                warn!(file = %file.display(), error = %e, "cannot read source for captured exception");
                (vec![unreadable_placeholder(file)], None)
            }
        };

        let stack_trace_html = match (&self.renderer, rich_trace) {
            (Some(renderer), true) => {
                let frames = match &self.frame_filter {
                    Some(filter) => filter(err.frames()),
                    None => err.frames(),
                };
                let trace = Value::List(frames.iter().map(Frame::to_value).collect());
                Some(
                    renderer
                        .render(&trace)
                        .map_err(|source| CollectError::Renderer { source })?,
                )
            }
            _ => None,
        };

        let debug_link = self
            .link_builder
            .as_ref()
            .and_then(|builder| builder.link(file, line));

        Ok(ExceptionRecord {
            kind: err.kind().to_string(),
            message: err.message(),
            code: err.code(),
            file: file.display().to_string(),
            line,
            stack_trace: err.trace_text(),
            stack_trace_html,
            surrounding_lines,
            surrounding_start_line,
            debug_link,
        })
    }
}

impl DataCollector for ExceptionsCollector {
    fn name(&self) -> &str {
        &self.name
    }

    fn collect(&self) -> Result<serde_json::Value, CollectError> {
        Ok(serde_json::to_value(self.payload())?)
    }

    fn assets(&self) -> Vec<Asset> {
        self.renderer
            .as_ref()
            .map(|r| r.required_assets())
            .unwrap_or_default()
    }
}

impl std::fmt::Debug for ExceptionsCollector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExceptionsCollector")
            .field("name", &self.name)
            .field("rich", &self.is_rich())
            .field("chain_unroll", &self.chain_unroll)
            .field("captured", &self.captured.len())
            .finish()
    }
}

#[cfg(test)]
#[path = "exceptions_tests.rs"]
mod tests;
