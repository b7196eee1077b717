//! # Caché LRU Thread-Safe
//! src/cache/lru.rs
//!
//! Caché de capacidad fija con desalojo del elemento usado hace más tiempo.
//!
//! ## Estructura
//!
//! ```text
//! index: HashMap<K, slot>
//!
//! nodes: [ slot0 ] <-> [ slot3 ] <-> [ slot1 ] <-> [ slot2 ]
//!          head (MRU)                             tail (LRU)
//! ```
//!
//! La lista doblemente enlazada vive dentro de un `Vec` y se enlaza por
//! índices, así `get` y `put` son O(1) sin punteros ni `unsafe`. Como solo se
//! desaloja cuando hay que insertar, el slot del desalojado se reutiliza y el
//! `Vec` nunca crece más allá de la capacidad.
//!
//! Un único `Mutex` protege índice y lista juntos.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Nodo de la lista de recencia
struct Node<K, V> {
    key: K,
    value: V,
    prev: Option<usize>,
    next: Option<usize>,
}

/// Estado protegido por el lock
struct LruState<K, V> {
    /// key → posición en `nodes`
    index: HashMap<K, usize>,

    /// Almacenamiento de los nodos
    nodes: Vec<Node<K, V>>,

    /// Usado más recientemente
    head: Option<usize>,

    /// Usado hace más tiempo (candidato a desalojo)
    tail: Option<usize>,
}

impl<K, V> LruState<K, V> {
    /// Desengancha un nodo de la lista sin tocar el índice
    fn detach(&mut self, slot: usize) {
        let (prev, next) = {
            let node = &self.nodes[slot];
            (node.prev, node.next)
        };

        match prev {
            Some(p) => self.nodes[p].next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => self.nodes[n].prev = prev,
            None => self.tail = prev,
        }

        let node = &mut self.nodes[slot];
        node.prev = None;
        node.next = None;
    }

    /// Engancha un nodo suelto como el más reciente
    fn push_front(&mut self, slot: usize) {
        self.nodes[slot].prev = None;
        self.nodes[slot].next = self.head;

        if let Some(old_head) = self.head {
            self.nodes[old_head].prev = Some(slot);
        }
        self.head = Some(slot);

        if self.tail.is_none() {
            self.tail = Some(slot);
        }
    }

    /// Mueve un nodo al frente de la lista
    fn touch(&mut self, slot: usize) {
        if self.head != Some(slot) {
            self.detach(slot);
            self.push_front(slot);
        }
    }
}

/// Caché LRU de capacidad fija, segura para usar desde varios workers
///
/// # Ejemplo
///
/// ```
/// use file_server::cache::LruCache;
///
/// let cache: LruCache<String, u32> = LruCache::new(2);
/// cache.put("a".to_string(), 1);
/// cache.put("b".to_string(), 2);
/// assert_eq!(cache.get("a"), Some(1));   // "a" pasa a ser el más reciente
///
/// cache.put("c".to_string(), 3);         // desaloja "b"
/// assert_eq!(cache.get("b"), None);
/// assert_eq!(cache.len(), 2);
/// ```
pub struct LruCache<K, V> {
    inner: Mutex<LruState<K, V>>,
    capacity: usize,
}

impl<K, V> LruCache<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    /// Crea una caché vacía. Una capacidad de 0 se ajusta a 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);

        Self {
            inner: Mutex::new(LruState {
                index: HashMap::with_capacity(capacity),
                nodes: Vec::with_capacity(capacity),
                head: None,
                tail: None,
            }),
            capacity,
        }
    }

    fn lock(&self) -> MutexGuard<'_, LruState<K, V>> {
        // Cada sección crítica deja la estructura consistente, así que un
        // lock envenenado se puede seguir usando
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Busca una key; en un hit la marca como la más reciente
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let mut state = self.lock();
        let slot = *state.index.get(key)?;
        state.touch(slot);
        Some(state.nodes[slot].value.clone())
    }

    /// Inserta o reemplaza un valor y lo marca como el más reciente
    ///
    /// Si la key es nueva y la caché está llena, primero se desaloja la
    /// entrada usada hace más tiempo.
    pub fn put(&self, key: K, value: V) {
        let mut state = self.lock();

        if let Some(&slot) = state.index.get(&key) {
            state.nodes[slot].value = value;
            state.touch(slot);
            return;
        }

        if state.index.len() >= self.capacity {
            if let Some(victim) = state.tail {
                state.detach(victim);
                let old_key = std::mem::replace(&mut state.nodes[victim].key, key.clone());
                state.index.remove(&old_key);
                state.nodes[victim].value = value;
                state.push_front(victim);
                state.index.insert(key, victim);
                return;
            }
        }

        let slot = state.nodes.len();
        state.nodes.push(Node {
            key: key.clone(),
            value,
            prev: None,
            next: None,
        });
        state.push_front(slot);
        state.index.insert(key, slot);
    }

    /// Verifica si una key está en la caché, sin alterar la recencia
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.lock().index.contains_key(key)
    }

    /// Keys residentes, de la más reciente a la más antigua
    pub fn keys(&self) -> Vec<K> {
        let state = self.lock();
        let mut keys = Vec::with_capacity(state.index.len());
        let mut cursor = state.head;

        while let Some(slot) = cursor {
            let node = &state.nodes[slot];
            keys.push(node.key.clone());
            cursor = node.next;
        }

        keys
    }

    /// Número de entradas vivas
    pub fn len(&self) -> usize {
        self.lock().index.len()
    }

    /// Verifica si la caché está vacía
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Capacidad máxima
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
