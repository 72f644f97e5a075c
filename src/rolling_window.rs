use std::collections::VecDeque;

/// Buffer FIFO de capacidad fija: al llenarse descarta la muestra más antigua.
/// La capacidad se fija al construir y nunca cambia.
#[derive(Debug, Clone)]
pub struct RollingWindow<T> {
    buffer: VecDeque<T>,
    capacity: usize,
}

impl<T> RollingWindow<T> {
    /// Crea una ventana vacía. Una capacidad de 0 se eleva a 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            buffer: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Añade una muestra; retorna la expulsada si la ventana estaba llena
    pub fn push(&mut self, value: T) -> Option<T> {
        let evicted = if self.buffer.len() >= self.capacity {
            self.buffer.pop_front()
        } else {
            None
        };
        self.buffer.push_back(value);
        evicted
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.buffer.len() >= self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Muestra más antigua
    pub fn first(&self) -> Option<&T> {
        self.buffer.front()
    }

    /// Muestra más reciente
    pub fn last(&self) -> Option<&T> {
        self.buffer.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.buffer.iter()
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

impl RollingWindow<f32> {
    /// Media aritmética de las muestras presentes (ventanas parciales incluidas)
    pub fn mean(&self) -> Option<f32> {
        if self.buffer.is_empty() {
            return None;
        }
        let sum: f32 = self.buffer.iter().sum();
        Some(sum / self.buffer.len() as f32)
    }
}
