//! # Collector de Métricas
//! src/metrics/collector.rs
//!
//! Agrega métricas del servidor en tiempo real. Todos los contadores son
//! atómicos; el log de requests recientes tiene su propio `Mutex`.

use crate::http::StatusCode;
use serde::Serialize;
use std::collections::{BTreeMap, VecDeque};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Instant;

/// Formato de los timestamps del log (hora local)
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Capacidad por defecto del log de requests recientes
pub const DEFAULT_RECENT_CAPACITY: usize = 100;

/// Una línea del log de requests recientes
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecentLogEntry {
    /// Momento del request, formato [`TIMESTAMP_FORMAT`]
    pub time: String,

    /// Dirección del cliente
    pub client: String,

    /// Path pedido (o `-` si el request no se pudo parsear)
    pub path: String,

    /// Código de estado enviado
    pub status: u16,

    /// Bytes escritos (headers + body)
    pub bytes: u64,
}

/// Snapshot de métricas, tal como se publica en `/admin/metrics`
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub total_requests: u64,
    pub uptime_seconds: u64,
    pub active_connections: u64,
    pub peak_connections: u64,
    pub bytes_sent: u64,
    pub status_counts: BTreeMap<String, u64>,
    pub recent: Vec<RecentLogEntry>,
}

/// Collector de métricas thread-safe
///
/// Se crea una vez al iniciar el proceso y se comparte con `Arc` entre
/// todas las conexiones.
pub struct MetricsCollector {
    /// Requests contados (excluye el endpoint de métricas)
    total_requests: AtomicU64,

    /// Bytes enviados en requests contados
    bytes_sent: AtomicU64,

    /// Un contador por cada código de [`StatusCode::ALL`]
    status_counts: [AtomicU64; StatusCode::ALL.len()],

    /// Conexiones abiertas en este momento
    active_connections: AtomicUsize,

    /// Máximo histórico de conexiones simultáneas
    peak_connections: AtomicUsize,

    /// Ring buffer con los últimos requests
    recent: Mutex<VecDeque<RecentLogEntry>>,

    /// Capacidad máxima de `recent`
    recent_capacity: usize,

    start_time: Instant,
}

impl MetricsCollector {
    /// Crea un collector con el log reciente por defecto (100 entradas)
    pub fn new() -> Self {
        Self::with_recent_capacity(DEFAULT_RECENT_CAPACITY)
    }

    /// Crea un collector con la capacidad indicada para el log reciente
    pub fn with_recent_capacity(recent_capacity: usize) -> Self {
        Self {
            total_requests: AtomicU64::new(0),
            bytes_sent: AtomicU64::new(0),
            status_counts: Default::default(),
            active_connections: AtomicUsize::new(0),
            peak_connections: AtomicUsize::new(0),
            recent: Mutex::new(VecDeque::with_capacity(recent_capacity)),
            recent_capacity,
            start_time: Instant::now(),
        }
    }

    fn lock_recent(&self) -> MutexGuard<'_, VecDeque<RecentLogEntry>> {
        self.recent.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registra un request completado
    ///
    /// Actualiza contadores y agrega la entrada al log reciente. Los códigos
    /// que no están en [`StatusCode::ALL`] cuentan en el total pero no tienen
    /// bucket propio.
    pub fn record_request(&self, entry: RecentLogEntry) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        self.bytes_sent.fetch_add(entry.bytes, Ordering::Relaxed);

        if let Some(bucket) = StatusCode::ALL
            .iter()
            .position(|status| status.as_u16() == entry.status)
        {
            self.status_counts[bucket].fetch_add(1, Ordering::Relaxed);
        }

        self.push_recent(entry);
    }

    /// Agrega al ring buffer, desalojando la entrada más antigua
    fn push_recent(&self, entry: RecentLogEntry) {
        if self.recent_capacity == 0 {
            return;
        }

        let mut recent = self.lock_recent();
        if recent.len() >= self.recent_capacity {
            recent.pop_front();
        }
        recent.push_back(entry);
    }

    /// Registra una conexión abierta
    ///
    /// La conexión se da por cerrada cuando el guard retornado sale de scope,
    /// sin importar por qué camino termine el handler.
    pub fn open_connection(&self) -> ConnectionGuard<'_> {
        let current = self.active_connections.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_connections.fetch_max(current, Ordering::SeqCst);
        ConnectionGuard { metrics: self }
    }

    fn close_connection(&self) {
        // Nunca baja de cero
        let _ = self
            .active_connections
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
    }

    /// Total de requests contados
    pub fn total_requests(&self) -> u64 {
        self.total_requests.load(Ordering::Relaxed)
    }

    /// Bytes enviados en requests contados
    pub fn bytes_sent(&self) -> u64 {
        self.bytes_sent.load(Ordering::Relaxed)
    }

    /// Conteo para un código de estado conocido
    pub fn status_count(&self, status: StatusCode) -> u64 {
        StatusCode::ALL
            .iter()
            .position(|s| *s == status)
            .map(|bucket| self.status_counts[bucket].load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    /// Conexiones abiertas
    pub fn active_connections(&self) -> usize {
        self.active_connections.load(Ordering::SeqCst)
    }

    /// Máximo de conexiones simultáneas desde el inicio
    pub fn peak_connections(&self) -> usize {
        self.peak_connections.load(Ordering::SeqCst)
    }

    /// Segundos desde que se creó el collector
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Copia del log reciente, del más antiguo al más nuevo
    pub fn recent(&self) -> Vec<RecentLogEntry> {
        self.lock_recent().iter().cloned().collect()
    }

    /// Obtiene un snapshot de las métricas
    ///
    /// El log reciente se copia bajo su lock y el lock se libera antes de
    /// leer el resto de los contadores.
    pub fn snapshot(&self) -> MetricsSnapshot {
        let recent = self.recent();

        let status_counts = StatusCode::ALL
            .iter()
            .zip(self.status_counts.iter())
            .map(|(status, count)| (status.as_u16().to_string(), count.load(Ordering::Relaxed)))
            .collect();

        MetricsSnapshot {
            total_requests: self.total_requests(),
            uptime_seconds: self.uptime_seconds(),
            active_connections: self.active_connections() as u64,
            peak_connections: self.peak_connections() as u64,
            bytes_sent: self.bytes_sent(),
            status_counts,
            recent,
        }
    }

    /// Obtiene las métricas actuales en formato JSON
    pub fn to_json(&self) -> String {
        // Serializar structs con tipos primitivos y mapas de String no falla
        serde_json::to_string(&self.snapshot())
            .unwrap_or_else(|e| json_error(&e.to_string()))
    }
}

/// Documento mínimo cuando no se pudo serializar el snapshot
fn json_error(message: &str) -> String {
    serde_json::json!({ "error": message }).to_string()
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

/// Guard RAII de una conexión activa
pub struct ConnectionGuard<'a> {
    metrics: &'a MetricsCollector,
}

impl Drop for ConnectionGuard<'_> {
    fn drop(&mut self) {
        self.metrics.close_connection();
    }
}
