// ABOUTME: Rollout state marker types for the type state pattern.
// ABOUTME: Zero-sized types enforce valid state transitions at compile time.

/// Initial state: spec validated and enriched, nothing submitted.
/// Available actions: `deploy()`
#[derive(Debug, Clone, Copy, Default)]
pub struct Initialized;

/// Spec submitted to the platform.
/// Available actions: `verify_health()`
#[derive(Debug, Clone, Copy, Default)]
pub struct Deployed;

/// App provisioned and its health endpoint answered.
/// Available actions: `stage_revision()`
#[derive(Debug, Clone, Copy, Default)]
pub struct HealthVerified;

/// New revision created and holding an initial traffic weight.
/// Available actions: `verify_revision()`, `shift()`, `promote()`, `demote()`
#[derive(Debug, Clone, Copy, Default)]
pub struct Staged;

/// Terminal: new revision holds all traffic, superseded revisions retired.
/// Available actions: `finish()`
#[derive(Debug, Clone, Copy, Default)]
pub struct Promoted;

/// Terminal: new revision drained to weight zero after a failed canary.
/// Available actions: `finish()`
#[derive(Debug, Clone, Copy, Default)]
pub struct Demoted;
