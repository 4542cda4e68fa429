//! Observability sink for engine-side visualization.
//!
//! Both engines report per-cell state transitions (frontier, visited,
//! final path, belief labels) through [`VizSink`]. The sink is purely an
//! observer: algorithmic results must be identical under [`NullSink`].

use crate::core::CellCoord;

/// RGB highlight color.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const WHITE: Color = Color { r: 255, g: 255, b: 255 };
    pub const YELLOW: Color = Color { r: 255, g: 255, b: 0 };
    pub const GREEN: Color = Color { r: 0, g: 255, b: 0 };
}

/// Receiver for per-cell visualization events.
pub trait VizSink {
    /// Highlight (or clear) a cell with a color and alpha.
    fn highlight(&mut self, cell: CellCoord, color: Color, alpha: f32);

    /// Attach a text label to a cell.
    fn set_label(&mut self, cell: CellCoord, text: &str);
}

/// Sink that drops every event; the default collaborator.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl VizSink for NullSink {
    fn highlight(&mut self, _cell: CellCoord, _color: Color, _alpha: f32) {}

    fn set_label(&mut self, _cell: CellCoord, _text: &str) {}
}

/// A recorded visualization event.
#[derive(Clone, Debug, PartialEq)]
pub enum VizEvent {
    Highlight {
        cell: CellCoord,
        color: Color,
        alpha: f32,
    },
    Label {
        cell: CellCoord,
        text: String,
    },
}

/// Sink that records events for assertions in tests and harnesses.
#[derive(Clone, Debug, Default)]
pub struct RecordingSink {
    pub events: Vec<VizEvent>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cells highlighted so far, in order.
    pub fn highlighted_cells(&self) -> Vec<CellCoord> {
        self.events
            .iter()
            .filter_map(|e| match e {
                VizEvent::Highlight { cell, .. } => Some(*cell),
                VizEvent::Label { .. } => None,
            })
            .collect()
    }
}

impl VizSink for RecordingSink {
    fn highlight(&mut self, cell: CellCoord, color: Color, alpha: f32) {
        self.events.push(VizEvent::Highlight { cell, color, alpha });
    }

    fn set_label(&mut self, cell: CellCoord, text: &str) {
        self.events.push(VizEvent::Label {
            cell,
            text: text.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_sink_captures_events() {
        let mut sink = RecordingSink::new();
        sink.highlight(CellCoord::new(1, 2), Color::YELLOW, 0.7);
        sink.set_label(CellCoord::new(1, 2), "0.25");
        assert_eq!(sink.events.len(), 2);
        assert_eq!(sink.highlighted_cells(), vec![CellCoord::new(1, 2)]);
    }

    #[test]
    fn test_null_sink_is_silent() {
        let mut sink = NullSink;
        sink.highlight(CellCoord::new(0, 0), Color::GREEN, 1.0);
        sink.set_label(CellCoord::new(0, 0), "x");
    }
}
