//! Graph construction from brew records
//!
//! The builder makes one pass over the records in input order. Each record
//! is validated in full before anything is written, then resolved through
//! the [`EntityRegistry`] and emitted as nodes and edges into a fresh
//! [`GraphStore`].
//!
//! With [`Strictness::Abort`] (the default) the first failing record
//! poisons the builder and no graph is returned. With [`Strictness::Skip`]
//! failing records are dropped and reported in the [`BuildReport`].

use crate::config::{BuildConfig, Strictness};
use crate::error::{BuildError, BuildResult, DuplicateKeyError};
use crate::graph::{EdgeKind, GraphStore, NodeId, NodeKind, PropertyMap, PropertyValue};
use crate::record::{
    epoch_day, roast_level_rank, BrewRecord, NoteIssue, NoteIssueReason, ValidatedBrew,
};
use crate::registry::{slugify, EntityRegistry, KeyPart, NaturalKey};
use serde::Serialize;
use std::borrow::Borrow;
use std::fmt;
use tracing::{debug, info, warn};

/// A recovered problem surfaced during a build
#[derive(Debug, Clone, PartialEq)]
pub enum BuildWarning {
    /// A flavor-note pair that could not be parsed and was skipped
    MalformedNote {
        brew_id: String,
        pair: String,
        reason: NoteIssueReason,
    },
    /// A flavor note listed twice in one record
    DuplicateNote { brew_id: String, note: String },
    /// A record dropped under [`Strictness::Skip`]
    SkippedRecord {
        brew_id: Option<String>,
        error: BuildError,
    },
}

impl BuildWarning {
    fn from_note_issue(brew_id: &str, issue: NoteIssue) -> Self {
        match issue.reason {
            NoteIssueReason::Duplicate => BuildWarning::DuplicateNote {
                brew_id: brew_id.to_string(),
                note: issue.pair,
            },
            reason => BuildWarning::MalformedNote {
                brew_id: brew_id.to_string(),
                pair: issue.pair,
                reason,
            },
        }
    }
}

impl fmt::Display for BuildWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildWarning::MalformedNote {
                brew_id,
                pair,
                reason,
            } => write!(f, "record {}: skipped note '{}': {}", brew_id, pair, reason),
            BuildWarning::DuplicateNote { brew_id, note } => {
                write!(f, "record {}: note '{}' repeated, last intensity kept", brew_id, note)
            }
            BuildWarning::SkippedRecord { brew_id, error } => match brew_id {
                Some(id) => write!(f, "record {} skipped: {}", id, error),
                None => write!(f, "record without brew_id skipped: {}", error),
            },
        }
    }
}

/// Counters and warnings of one build
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuildReport {
    pub records_seen: usize,
    pub records_built: usize,
    pub warnings: Vec<BuildWarning>,
}

impl BuildReport {
    pub fn records_skipped(&self) -> usize {
        self.records_seen - self.records_built
    }

    pub fn summary(&self) -> BuildSummary {
        BuildSummary {
            records_seen: self.records_seen,
            records_built: self.records_built,
            warnings: self.warnings.iter().map(ToString::to_string).collect(),
        }
    }
}

/// Serializable view of a [`BuildReport`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuildSummary {
    pub records_seen: usize,
    pub records_built: usize,
    pub warnings: Vec<String>,
}

/// A finished graph together with its build report
#[derive(Debug, Clone)]
pub struct BuildOutcome {
    pub graph: GraphStore,
    pub report: BuildReport,
}

/// Single-pass graph builder
#[derive(Debug)]
pub struct GraphBuilder {
    store: GraphStore,
    registry: EntityRegistry,
    config: BuildConfig,
    report: BuildReport,
    failed: Option<BuildError>,
}

impl GraphBuilder {
    pub fn new(config: BuildConfig) -> Self {
        Self {
            store: GraphStore::new(),
            registry: EntityRegistry::new(),
            config,
            report: BuildReport::default(),
            failed: None,
        }
    }

    /// Add one record to the graph.
    ///
    /// Returns the new BrewSession, or `None` when the record was skipped.
    /// Once a record has failed under [`Strictness::Abort`] every further
    /// call returns that same error.
    pub fn add_record(&mut self, record: &BrewRecord) -> BuildResult<Option<NodeId>> {
        if let Some(err) = &self.failed {
            return Err(err.clone());
        }
        self.report.records_seen += 1;

        let brew = match self.validate(record) {
            Ok(brew) => brew,
            Err(err) => return self.reject(err),
        };

        match self.apply(brew) {
            Ok(session) => {
                self.report.records_built += 1;
                Ok(Some(session))
            }
            Err(err) => {
                // Store-level failures mean the graph is inconsistent
                self.failed = Some(err.clone());
                Err(err)
            }
        }
    }

    /// Consume the builder and hand out the finished graph
    pub fn finish(self) -> BuildResult<BuildOutcome> {
        if let Some(err) = self.failed {
            return Err(err);
        }
        info!(
            "Built graph: {} nodes, {} edges from {} of {} records ({} warnings)",
            self.store.node_count(),
            self.store.edge_count(),
            self.report.records_built,
            self.report.records_seen,
            self.report.warnings.len()
        );
        Ok(BuildOutcome {
            graph: self.store,
            report: self.report,
        })
    }

    /// Current report, before the build is finished
    pub fn report(&self) -> &BuildReport {
        &self.report
    }

    fn validate(&self, record: &BrewRecord) -> BuildResult<ValidatedBrew> {
        let brew = ValidatedBrew::from_record(record, &self.config)?;
        if self.registry.lookup(&brew.keys.session).is_some() {
            return Err(DuplicateKeyError {
                brew_id: brew.brew_id,
            }
            .into());
        }
        Ok(brew)
    }

    fn reject(&mut self, err: BuildError) -> BuildResult<Option<NodeId>> {
        match self.config.strictness {
            Strictness::Abort => {
                warn!("Aborting build: {}", err);
                self.failed = Some(err.clone());
                Err(err)
            }
            Strictness::Skip => {
                warn!("Skipping record: {}", err);
                self.report.warnings.push(BuildWarning::SkippedRecord {
                    brew_id: err.brew_id().map(str::to_string),
                    error: err,
                });
                Ok(None)
            }
        }
    }

    fn resolve(&mut self, key: NaturalKey, attrs: PropertyMap) -> NodeId {
        self.registry.resolve_key(&mut self.store, key, attrs).id
    }

    fn apply(&mut self, brew: ValidatedBrew) -> BuildResult<NodeId> {
        let ValidatedBrew {
            brew_id,
            keys,
            roaster,
            coffee_name,
            roast_level,
            roast_date,
            grinder,
            grind_setting,
            brewer_brand,
            brewer_model,
            brew_method,
            session,
            method_params,
            ratings,
            notes,
            note_issues,
        } = brew;

        // Shared entities
        let roaster_id = self.resolve(keys.roaster, properties([("name", roaster.as_str().into())]));
        let bean_id = self.resolve(
            keys.bean_lot,
            properties([
                ("roaster", roaster.as_str().into()),
                ("coffee_name", coffee_name.as_str().into()),
            ]),
        );
        let mut batch_attrs = properties([
            ("coffee_name", coffee_name.as_str().into()),
            ("roast_level", roast_level.as_str().into()),
        ]);
        // Numeric forms so roast batches can be compared
        if let Some(rank) = roast_level_rank(&roast_level) {
            batch_attrs.insert("roast_level_rank".to_string(), rank.into());
        }
        if let Some(date) = &roast_date {
            batch_attrs.insert("roast_date".to_string(), date.as_str().into());
            if let Some(day) = epoch_day(date) {
                batch_attrs.insert("roast_day".to_string(), day.into());
            }
        }
        let batch_id = self.resolve(keys.roast_batch, batch_attrs);
        let grinder_id = match (keys.grinder, grinder) {
            (Some(key), Some(name)) => Some(self.resolve(key, properties([("name", name.into())]))),
            _ => None,
        };
        let brewer_id = self.resolve(
            keys.brewer,
            properties([("brand", brewer_brand.into()), ("model", brewer_model.into())]),
        );

        // Provenance edges are shared across sessions
        self.store
            .ensure_edge(roaster_id, bean_id, EdgeKind::Produces, PropertyMap::new())?;
        let roasted_as = roast_date
            .map(|date| properties([("roast_date", date.into())]))
            .unwrap_or_default();
        self.store
            .ensure_edge(bean_id, batch_id, EdgeKind::RoastedAs, roasted_as)?;

        // The session itself
        let session_id = self.resolve(keys.session, session);

        self.store
            .create_edge(session_id, batch_id, EdgeKind::UsesRoast, PropertyMap::new())?;

        let mut brewed_with = properties([("brew_method", brew_method.into())]);
        match grinder_id {
            Some(grinder_id) => {
                let uses_grinder = grind_setting
                    .map(|setting| properties([("grind_setting", setting)]))
                    .unwrap_or_default();
                self.store
                    .create_edge(session_id, grinder_id, EdgeKind::UsesGrinder, uses_grinder)?;
            }
            None => {
                if let Some(setting) = grind_setting {
                    brewed_with.insert("grind_setting".to_string(), setting);
                }
            }
        }
        brewed_with.extend(method_params);
        self.store
            .create_edge(session_id, brewer_id, EdgeKind::BrewedWith, brewed_with)?;

        // Evaluation owned by the session
        let mut eval_attrs = properties([("brew_id", brew_id.as_str().into())]);
        eval_attrs.extend(ratings.to_properties());
        let eval_key = self
            .registry
            .allocate_slug(format!("eval:{}", slugify(&brew_id)));
        let eval_id = self
            .store
            .create_node(NodeKind::SensoryEvaluation, eval_key, eval_attrs);
        self.store
            .create_edge(session_id, eval_id, EdgeKind::EvaluatedAs, PropertyMap::new())?;

        for note in notes {
            let note_id = self
                .registry
                .resolve_or_create(
                    &mut self.store,
                    NodeKind::FlavorNote,
                    &[KeyPart::required("note", Some(note.name.as_str()))],
                    properties([("name", note.name.as_str().into())]),
                )
                .map_err(|e| e.for_brew(brew_id.as_str()))?
                .id;
            self.store.create_edge(
                eval_id,
                note_id,
                EdgeKind::HasNote,
                properties([("intensity", note.intensity)]),
            )?;
        }

        for issue in note_issues {
            let warning = BuildWarning::from_note_issue(&brew_id, issue);
            warn!("{}", warning);
            self.report.warnings.push(warning);
        }

        debug!("Added brew session {} as {}", brew_id, session_id);
        Ok(session_id)
    }
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new(BuildConfig::default())
    }
}

fn properties<const N: usize>(pairs: [(&str, PropertyValue); N]) -> PropertyMap {
    pairs
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect()
}

/// Build a graph with the default configuration (abort on first error)
pub fn build<I, R>(records: I) -> BuildResult<GraphStore>
where
    I: IntoIterator<Item = R>,
    R: Borrow<BrewRecord>,
{
    build_with_config(records, &BuildConfig::default()).map(|outcome| outcome.graph)
}

/// Build a graph and report recovered problems
pub fn build_with_config<I, R>(records: I, config: &BuildConfig) -> BuildResult<BuildOutcome>
where
    I: IntoIterator<Item = R>,
    R: Borrow<BrewRecord>,
{
    info!("Starting graph build (strictness: {:?})", config.strictness);
    let mut builder = GraphBuilder::new(config.clone());
    for record in records {
        builder.add_record(record.borrow())?;
    }
    builder.finish()
}
