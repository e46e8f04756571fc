use core_config::{Config, TerminatorConfig};
use core_events::{Signal, TurnQueue};
use core_model::{DocEvent, Document, InsertTextPrimitive, Surface, SurfaceTarget, classify};
use core_registry::{
    ExpansionRecord, JsonFileStore, RecordSubscription, RegistryCache, RegistryError,
    RegistryStore,
};

use crate::binding::{self, ExpansionRequest, MatchMode};
use crate::executor;
use crate::{DeferredTask, EngineMetrics, GuardState, ReentrancyGuard, TriggerHit, TriggerMatcher};

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("trigger pattern: {0}")]
    Pattern(#[from] regex::Error),
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// How a signal was handled. None of these are failures: everything except
/// `Expanded` means the host treats the signal as ordinary input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The trigger was replaced. When `prevent_default` is set the host must
    /// cancel its own handling of the signal.
    Expanded { prevent_default: bool },
    /// A replacement was in flight; the signal is its echo or arrived too soon.
    Suppressed,
    /// No editable surface is active.
    Unsupported,
    NoMatch,
    /// The surface changed under the replacement.
    Aborted,
}

impl Outcome {
    pub fn prevent_default(&self) -> bool {
        matches!(
            self,
            Outcome::Expanded {
                prevent_default: true
            }
        )
    }
}

/// Text-expansion engine for one document.
///
/// Each engine owns its guard and turn queue, so independent engines (one per
/// frame, say) never suppress each other. The host calls `handle` for every
/// input signal and `end_turn` once per scheduler tick.
pub struct Engine {
    terminators: TerminatorConfig,
    matcher: TriggerMatcher,
    cache: RegistryCache,
    subscription: Option<RecordSubscription>,
    guard: ReentrancyGuard,
    turn: TurnQueue<DeferredTask>,
    primitive: Option<Box<dyn InsertTextPrimitive>>,
    metrics: EngineMetrics,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("prefix", &self.matcher.prefix())
            .field("guard", &self.guard.state())
            .field("generation", &self.cache.generation())
            .field("primitive", &self.primitive.as_ref().map(|p| p.name()))
            .finish()
    }
}

impl Engine {
    pub fn new(config: &Config) -> Result<Self, EngineError> {
        let prefix = config.effective_prefix();
        let matcher = TriggerMatcher::new(prefix)?;
        tracing::info!(target: "engine.expand", %prefix, "engine_created");
        Ok(Self {
            terminators: config.terminators(),
            matcher,
            cache: RegistryCache::new(prefix),
            subscription: None,
            guard: ReentrancyGuard::new(),
            turn: TurnQueue::new(),
            primitive: None,
            metrics: EngineMetrics::default(),
        })
    }

    /// Load the store's records and follow its change notifications.
    pub fn attach_store(&mut self, store: &dyn RegistryStore) -> Result<(), EngineError> {
        let records = store.get_all()?;
        self.load_records(&records);
        self.subscription = Some(store.subscribe());
        Ok(())
    }

    /// Replace the cached registry without a store.
    pub fn load_records(&mut self, records: &[ExpansionRecord]) {
        self.cache.rebuild(records);
        EngineMetrics::bump(&self.metrics.cache_rebuilds);
    }

    pub fn set_insert_primitive(&mut self, primitive: Box<dyn InsertTextPrimitive>) {
        tracing::debug!(target: "engine.expand", primitive = primitive.name(), "insert_primitive_installed");
        self.primitive = Some(primitive);
    }

    pub fn clear_insert_primitive(&mut self) -> Option<Box<dyn InsertTextPrimitive>> {
        self.primitive.take()
    }

    pub fn cache(&self) -> &RegistryCache {
        &self.cache
    }

    pub fn guard_state(&self) -> GuardState {
        self.guard.state()
    }

    pub fn metrics(&self) -> &EngineMetrics {
        &self.metrics
    }

    /// Run tasks deferred during the previous turn. Hosts call this on every
    /// scheduler tick, after the current signal's notifications went out.
    pub fn end_turn(&mut self) {
        for task in self.turn.drain() {
            match task {
                DeferredTask::ReleaseGuard => self.guard.release(),
            }
        }
    }

    fn sync_registry(&mut self) {
        let Some(subscription) = self.subscription.as_mut() else {
            return;
        };
        if let Some(records) = subscription.poll() {
            self.cache.rebuild(&records);
            EngineMetrics::bump(&self.metrics.cache_rebuilds);
        }
    }

    pub fn handle(&mut self, doc: &mut Document, signal: &Signal) -> Outcome {
        EngineMetrics::bump(&self.metrics.signals);
        self.sync_registry();
        if self.guard.is_replacing() {
            EngineMetrics::bump(&self.metrics.suppressed);
            tracing::trace!(target: "engine.guard", signal = signal.label(), "suppressed");
            return Outcome::Suppressed;
        }
        let Some(target) = classify(doc) else {
            EngineMetrics::bump(&self.metrics.unsupported);
            return Outcome::Unsupported;
        };
        let primitive = self
            .primitive
            .as_deref_mut()
            .map(|p| p as &mut dyn InsertTextPrimitive);
        let Some(mut surface) = target.open(doc, primitive) else {
            EngineMetrics::bump(&self.metrics.unsupported);
            return Outcome::Unsupported;
        };
        let Some(request) = binding::translate(signal, surface.kind(), &self.terminators) else {
            EngineMetrics::bump(&self.metrics.no_match);
            return Outcome::NoMatch;
        };
        let resolved = resolve(&*surface, &request, &self.matcher, &self.cache);
        let Some((hit, content)) = resolved else {
            EngineMetrics::bump(&self.metrics.no_match);
            return Outcome::NoMatch;
        };
        let terminator = match hit.typed_terminator {
            Some(typed) => typed.to_string(),
            None => request.terminator.to_string(),
        };

        self.guard.arm(&mut self.turn);
        let result = executor::replace(surface.as_mut(), &hit, &content, &terminator);
        drop(surface);

        match result {
            Ok(done) => {
                if let SurfaceTarget::Rich { root } = target {
                    doc.push_event(DocEvent::ContentChanged { target: root });
                }
                self.metrics.record_replacement(done.deleted, done.inserted);
                tracing::debug!(
                    target: "engine.expand",
                    signal = signal.label(),
                    trigger_len = hit.delete_len,
                    prevent_default = request.prevent_default,
                    "expanded"
                );
                Outcome::Expanded {
                    prevent_default: request.prevent_default,
                }
            }
            Err(error) => {
                EngineMetrics::bump(&self.metrics.aborted);
                tracing::debug!(target: "engine.expand", %error, "replacement_aborted");
                Outcome::Aborted
            }
        }
    }
}

/// Open the JSON record store named by `[registry] path`, if one is set.
/// Hosts keep the store alive and pass it to [`Engine::attach_store`].
pub fn configured_store(config: &Config) -> Option<JsonFileStore> {
    let path = config.registry_path()?;
    tracing::info!(target: "registry", path = %path.display(), "configured_store_opened");
    Some(JsonFileStore::new(path, config.effective_prefix()))
}

/// Match the trailing text and resolve it against enabled records.
fn resolve(
    surface: &dyn Surface,
    request: &ExpansionRequest,
    matcher: &TriggerMatcher,
    cache: &RegistryCache,
) -> Option<(TriggerHit, String)> {
    let trailing = surface.text_before_cursor();
    let hit = match request.mode {
        MatchMode::Immediate => matcher.find(&trailing)?,
        MatchMode::AfterTerminator => {
            let hit = matcher.find_before_terminator(&trailing)?;
            if !request.accepts_typed(hit.typed_terminator?) {
                return None;
            }
            hit
        }
    };
    let record = cache.lookup(&hit.trigger)?;
    Some((hit, record.content.clone()))
}
