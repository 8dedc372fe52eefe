//! Text rendering sink for arm frames.

use std::io::{self, Write};

use reach_ik::ArmFrame;

/// Consumer of per-tick frames. Has no influence on solver state.
pub trait FrameSink {
    /// Present one frame.
    fn present(&mut self, frame: &ArmFrame) -> io::Result<()>;
}

/// Writes one summary line per presented frame.
pub struct TextSink<W: Write> {
    out: W,
    show_joints: bool,
}

impl<W: Write> TextSink<W> {
    pub const fn new(out: W, show_joints: bool) -> Self {
        Self { out, show_joints }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> FrameSink for TextSink<W> {
    fn present(&mut self, frame: &ArmFrame) -> io::Result<()> {
        writeln!(self.out, "{}", format_frame(frame, self.show_joints))
    }
}

/// One-line description of a frame.
pub fn format_frame(frame: &ArmFrame, show_joints: bool) -> String {
    let ee = frame.end_effector();
    let mut line = format!(
        "Moves: {:>4}  {:<7}  ee [{:+.3}, {:+.3}]",
        frame.movement_count, frame.tracking, ee.x, ee.y
    );
    match (frame.target, frame.error()) {
        (Some(target), Some(error)) => line.push_str(&format!(
            "  target [{:+.2}, {:+.2}]  err={error:.4}",
            target.x, target.y
        )),
        _ => line.push_str("  target none"),
    }
    if show_joints {
        let joints: Vec<String> = frame
            .joint_positions
            .iter()
            .map(|p| format!("({:+.2}, {:+.2})", p.x, p.y))
            .collect();
        line.push_str("  joints ");
        line.push_str(&joints.join(" "));
    }
    line
}

#[cfg(test)]
mod tests {
    use reach_ik::ArmState;

    use super::*;

    #[test]
    fn format_includes_moves_and_target() {
        let frame = ArmState::default().frame();
        let line = format_frame(&frame, false);
        assert!(line.starts_with("Moves:    0"));
        assert!(line.contains("seeking"));
        assert!(line.contains("target [+3.00, +1.00]"));
        assert!(!line.contains("joints"));
    }

    #[test]
    fn format_lists_joints_on_request() {
        let frame = ArmState::default().frame();
        let line = format_frame(&frame, true);
        assert_eq!(line.matches(") ").count() + 1, frame.joint_positions.len());
        assert!(line.contains("joints (+0.00, +0.00)"));
    }

    #[test]
    fn format_joint_list_is_space_separated() {
        // Default pose: two links of sqrt(10)/2 at 45 deg each.
        let frame = ArmState::default().frame();
        let line = format_frame(&frame, true);
        assert!(
            line.ends_with("  joints (+0.00, +0.00) (+1.12, +1.12) (+1.12, +2.70)"),
            "{line}"
        );
    }

    #[test]
    fn format_without_target() {
        let mut state = ArmState::default();
        state.clear_target();
        let line = format_frame(&state.frame(), false);
        assert!(line.contains("target none"));
    }

    #[test]
    fn text_sink_writes_one_line_per_frame() {
        let frame = ArmState::default().frame();
        let mut sink = TextSink::new(Vec::new(), false);
        sink.present(&frame).unwrap();
        sink.present(&frame).unwrap();
        let text = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(text.lines().count(), 2);
    }
}
