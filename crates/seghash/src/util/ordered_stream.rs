use std::collections::BTreeMap;
use tokio::sync::mpsc;

/// Re-sequences items that arrive out of order.
///
/// Every slot must be sent exactly once, starting from 0. Items are released
/// strictly by slot; a gap holds back everything after it.
pub struct OrderedStream<T> {
    // slot -> item
    buffer: BTreeMap<u64, T>,
    next_slot: u64,
    // slot, item
    rx: mpsc::UnboundedReceiver<(u64, T)>,
}

impl<T> OrderedStream<T> {
    pub fn new(rx: mpsc::UnboundedReceiver<(u64, T)>) -> Self {
        Self {
            buffer: BTreeMap::new(),
            next_slot: 0,
            rx,
        }
    }

    pub async fn next(&mut self) -> Option<(u64, T)> {
        loop {
            // Check if we have the next item in buffer
            if let Some(item) = self.buffer.remove(&self.next_slot) {
                return Some(self.advance(item));
            }

            match self.rx.recv().await {
                Some((slot, item)) if slot == self.next_slot => return Some(self.advance(item)),
                Some((slot, item)) => {
                    debug_assert!(slot > self.next_slot, "slot {slot} sent twice");
                    self.buffer.insert(slot, item);
                }
                None => return None,
            }
        }
    }

    fn advance(&mut self, item: T) -> (u64, T) {
        let slot = self.next_slot;
        self.next_slot += 1;
        (slot, item)
    }
}
