use log::debug;
use std::collections::HashMap;

use crate::constants::{DEFAULT_CARD_SPACING_PX, DEFAULT_ITEM_HEIGHT_PX};

/// Converts a continuous vertical drag into discrete list-position swaps.
///
/// The engine owns only transient state: the current on-screen order, the
/// measured height of each item, the accumulated drag delta of the item
/// being dragged, and which item that is. Nothing here touches the store;
/// callers persist the order returned by [`ReorderEngine::finish_drag`].
///
/// Gesture events are inherently serial per pointer, so the engine is not
/// synchronized internally.
pub struct ReorderEngine {
    /// Current rendered order of platform ids
    ordered_ids: Vec<i32>,
    /// Measured pixel height per item id
    heights_px: HashMap<i32, f32>,
    /// Accumulated vertical drag delta per item id
    accumulated_dy: HashMap<i32, f32>,
    /// Item currently being dragged, at most one at a time
    dragging_id: Option<i32>,
    /// Index of the dragged item when the drag began
    drag_start_index: Option<usize>,
    /// Constant visual gap between stacked items
    spacing_px: f32,
}

impl ReorderEngine {
    pub fn new(spacing_px: f32) -> Self {
        Self {
            ordered_ids: Vec::new(),
            heights_px: HashMap::new(),
            accumulated_dy: HashMap::new(),
            dragging_id: None,
            drag_start_index: None,
            spacing_px,
        }
    }

    /// Records an item's rendered height. Fed continuously by the layout
    /// side channel, independent of drag state.
    pub fn set_item_height(&mut self, id: i32, height_px: f32) {
        debug!("Measured item {}: {} px", id, height_px);
        self.heights_px.insert(id, height_px);
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging_id.is_some()
    }

    pub fn dragging_id(&self) -> Option<i32> {
        self.dragging_id
    }

    pub fn ordered_ids(&self) -> &[i32] {
        &self.ordered_ids
    }

    /// Accumulated offset of an item, for the smoothed render of the
    /// dragged card. Items at rest report zero.
    pub fn accumulated_offset(&self, id: i32) -> f32 {
        self.accumulated_dy.get(&id).copied().unwrap_or(0.0)
    }

    /// Enters the Dragging state on a long-press of `id`.
    ///
    /// Snapshots the rendered order only when no snapshot exists yet, so
    /// successive drags keep operating on the already-reordered list.
    /// Returns false when the item is not part of the rendered order.
    pub fn begin_drag(&mut self, id: i32, rendered_order: &[i32]) -> bool {
        if self.ordered_ids.is_empty() {
            self.ordered_ids = rendered_order.to_vec();
            debug!("Initialized order snapshot: {:?}", self.ordered_ids);
        }

        let start_index = match self.ordered_ids.iter().position(|&x| x == id) {
            Some(i) => i,
            None => return false,
        };

        self.dragging_id = Some(id);
        self.drag_start_index = Some(start_index);
        self.accumulated_dy.insert(id, 0.0);
        true
    }

    /// Handles one incremental drag delta while in the Dragging state.
    ///
    /// Accumulates `dy`, compares the running total against asymmetric
    /// thresholds derived from the neighbors' measured heights, and moves
    /// the dragged item by a whole number of steps when a threshold is
    /// crossed. The consumed displacement is subtracted so residual
    /// sub-threshold motion carries forward.
    ///
    /// The step count truncates toward zero for both directions (an
    /// `as i32` cast); for negative accumulators this differs from floor
    /// division.
    pub fn drag_by(&mut self, dy: f32) {
        let dragging_id = match self.dragging_id {
            Some(id) => id,
            None => return,
        };

        let acc = self.accumulated_offset(dragging_id) + dy;
        self.accumulated_dy.insert(dragging_id, acc);

        let current_index = match self.ordered_ids.iter().position(|&x| x == dragging_id) {
            Some(i) => i,
            None => return,
        };

        let above_h = current_index
            .checked_sub(1)
            .and_then(|i| self.height_of(self.ordered_ids[i]));
        let below_h = self
            .ordered_ids
            .get(current_index + 1)
            .and_then(|&id| self.height_of(id));
        let fallback_h = self.fallback_height(dragging_id);

        let threshold_down = below_h.unwrap_or(fallback_h) / 2.0 + self.spacing_px;
        let threshold_up = above_h.unwrap_or(fallback_h) / 2.0 + self.spacing_px;
        debug!(
            "acc={}, threshold_up={}, threshold_down={}",
            acc, threshold_up, threshold_down
        );

        let steps = if acc >= threshold_down {
            (acc / threshold_down) as i32
        } else if acc <= -threshold_up {
            (acc / threshold_up) as i32 // negative
        } else {
            0
        };

        if steps != 0 {
            let target_index = (current_index as i32 + steps)
                .clamp(0, self.ordered_ids.len() as i32 - 1)
                as usize;
            if target_index != current_index {
                self.ordered_ids.remove(current_index);
                self.ordered_ids.insert(target_index, dragging_id);
                // Cancel out the displacement already spent on the move.
                let step_threshold = if steps > 0 { threshold_down } else { threshold_up };
                let consumed = steps as f32 * step_threshold;
                self.accumulated_dy.insert(dragging_id, acc - consumed);
                debug!(
                    "Moved item {} from {} to {}, residual={}",
                    dragging_id,
                    current_index,
                    target_index,
                    acc - consumed
                );
            }
        }
    }

    /// Leaves the Dragging state.
    ///
    /// Returns the order to persist (when a snapshot exists) and clears
    /// the dragged-item id, start index and every accumulated delta. The
    /// order snapshot itself is kept for the next drag.
    pub fn finish_drag(&mut self) -> Option<Vec<i32>> {
        self.dragging_id = None;
        self.drag_start_index = None;
        self.accumulated_dy.clear();

        if self.ordered_ids.is_empty() {
            None
        } else {
            Some(self.ordered_ids.clone())
        }
    }

    /// Cancelled drags behave exactly like completed ones.
    pub fn cancel_drag(&mut self) -> Option<Vec<i32>> {
        self.finish_drag()
    }

    /// Drops the order snapshot, e.g. after the persisted order was
    /// reloaded from the store.
    pub fn reset_order(&mut self) {
        self.ordered_ids.clear();
    }

    fn height_of(&self, id: i32) -> Option<f32> {
        self.heights_px.get(&id).copied()
    }

    /// Fallback when a neighbor height is unknown: the dragged item's own
    /// height, else the mean of all known heights, else a fixed default.
    fn fallback_height(&self, dragging_id: i32) -> f32 {
        if let Some(h) = self.height_of(dragging_id) {
            return h;
        }
        if !self.heights_px.is_empty() {
            return self.heights_px.values().sum::<f32>() / self.heights_px.len() as f32;
        }
        DEFAULT_ITEM_HEIGHT_PX
    }
}

impl Default for ReorderEngine {
    fn default() -> Self {
        Self::new(DEFAULT_CARD_SPACING_PX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine_with_heights(heights: &[(i32, f32)]) -> ReorderEngine {
        let mut engine = ReorderEngine::new(16.0);
        for &(id, h) in heights {
            engine.set_item_height(id, h);
        }
        engine
    }

    #[test]
    fn single_downward_step_consumes_threshold() {
        // Heights [100, 150, 200]; dragging the middle item down, the
        // threshold is 200/2 + 16 = 116.
        let mut engine = engine_with_heights(&[(1, 100.0), (2, 150.0), (3, 200.0)]);
        assert!(engine.begin_drag(2, &[1, 2, 3]));

        engine.drag_by(120.0);

        assert_eq!(engine.ordered_ids(), &[1, 3, 2]);
        assert!((engine.accumulated_offset(2) - 4.0).abs() < 1e-3);
    }

    #[test]
    fn sub_threshold_motion_accumulates_without_moving() {
        let mut engine = engine_with_heights(&[(1, 100.0), (2, 150.0), (3, 200.0)]);
        engine.begin_drag(2, &[1, 2, 3]);

        engine.drag_by(60.0);
        assert_eq!(engine.ordered_ids(), &[1, 2, 3]);

        // The residual carries forward; 60 + 60 crosses 116.
        engine.drag_by(60.0);
        assert_eq!(engine.ordered_ids(), &[1, 3, 2]);
    }

    #[test]
    fn upward_steps_truncate_toward_zero() {
        // thresholdUp = 200/2 + 16 = 116; acc = -250 gives -2 steps
        // (truncation), not -3 (floor).
        let mut engine = engine_with_heights(&[(1, 200.0), (2, 200.0), (3, 150.0)]);
        engine.begin_drag(3, &[1, 2, 3]);

        engine.drag_by(-250.0);

        assert_eq!(engine.ordered_ids(), &[3, 1, 2]);
        assert!((engine.accumulated_offset(3) - (-250.0 + 2.0 * 116.0)).abs() < 1e-3);
    }

    #[test]
    fn clamped_at_top_keeps_accumulating() {
        let mut engine = engine_with_heights(&[(1, 100.0), (2, 100.0)]);
        engine.begin_drag(1, &[1, 2]);

        engine.drag_by(-500.0);

        // Already first; nothing to consume, the accumulator keeps the motion.
        assert_eq!(engine.ordered_ids(), &[1, 2]);
        assert!((engine.accumulated_offset(1) - (-500.0)).abs() < 1e-3);
    }

    #[test]
    fn unknown_heights_fall_back_to_default() {
        // No measurements at all: threshold = 120/2 + 16 = 76.
        let mut engine = ReorderEngine::new(16.0);
        engine.begin_drag(1, &[1, 2]);

        engine.drag_by(80.0);

        assert_eq!(engine.ordered_ids(), &[2, 1]);
    }

    #[test]
    fn missing_neighbor_height_falls_back_to_own_height() {
        // Only the dragged item is measured: threshold = 90/2 + 16 = 61.
        let mut engine = engine_with_heights(&[(1, 90.0)]);
        engine.begin_drag(1, &[1, 2]);

        engine.drag_by(62.0);
        assert_eq!(engine.ordered_ids(), &[2, 1]);
    }

    #[test]
    fn finish_returns_order_and_clears_drag_state() {
        let mut engine = engine_with_heights(&[(1, 100.0), (2, 150.0), (3, 200.0)]);
        engine.begin_drag(2, &[1, 2, 3]);
        engine.drag_by(120.0);

        let order = engine.finish_drag();
        assert_eq!(order, Some(vec![1, 3, 2]));
        assert!(!engine.is_dragging());
        assert_eq!(engine.accumulated_offset(2), 0.0);

        // Cancel behaves exactly like finish.
        engine.begin_drag(2, &[9, 9, 9]); // snapshot already populated, argument ignored
        let cancelled = engine.cancel_drag();
        assert_eq!(cancelled, Some(vec![1, 3, 2]));
    }

    #[test]
    fn finish_without_snapshot_returns_none() {
        let mut engine = ReorderEngine::default();
        assert_eq!(engine.finish_drag(), None);
    }

    #[test]
    fn begin_drag_rejects_unknown_item() {
        let mut engine = ReorderEngine::default();
        assert!(!engine.begin_drag(7, &[1, 2, 3]));
        assert!(!engine.is_dragging());
    }

    #[test]
    fn snapshot_initializes_only_once() {
        let mut engine = ReorderEngine::default();
        engine.begin_drag(1, &[1, 2, 3]);
        engine.finish_drag();

        // A later drag with a different rendered order keeps the snapshot.
        engine.begin_drag(2, &[3, 2, 1]);
        assert_eq!(engine.ordered_ids(), &[1, 2, 3]);
    }
}
