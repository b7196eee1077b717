//! # Sistema de Métricas
//! src/metrics/mod.rs
//!
//! Recolección y agregación de métricas del servidor:
//! - Contadores de requests y bytes enviados
//! - Requests por código de estado (200, 400, 403, 404, 405, 500)
//! - Conexiones activas y pico histórico
//! - Log de los últimos requests (ring buffer)

pub mod collector;

pub use collector::{ConnectionGuard, MetricsCollector, MetricsSnapshot, RecentLogEntry};
