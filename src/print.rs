use crate::scene::Scene;
use std::io::{self, Write};

/// Text console renderer. Writes a scene only when it differs from the last one written.
pub struct Printer<W: Write> {
    out: W,
    last: Option<Vec<String>>,
}

impl<W: Write> Printer<W> {
    pub fn new(out: W) -> Self {
        Self { out, last: None }
    }

    /// Returns whether anything was written.
    pub fn render(&mut self, scene: &Scene) -> io::Result<bool> {
        let lines = scene.lines();
        if !scene.changed && self.last.as_ref() == Some(&lines) {
            return Ok(false);
        }
        for line in &lines {
            writeln!(self.out, "{line}")?;
        }
        writeln!(self.out)?;
        self.out.flush()?;
        self.last = Some(lines);
        Ok(true)
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Phase;

    fn scene(status: &str, changed: bool) -> Scene {
        Scene {
            phase: Phase::InGame,
            home: "MIN".into(),
            away: "DEN".into(),
            home_score: 12,
            away_score: 8,
            status: status.into(),
            events: vec!["Edwards dunk".into()],
            detail: None,
            changed,
        }
    }

    #[test]
    fn prints_first_scene_and_skips_repeats() {
        let mut printer = Printer::new(Vec::new());
        assert!(printer.render(&scene("Q2 4:45", false)).unwrap());
        assert!(!printer.render(&scene("Q2 4:45", false)).unwrap());
        assert!(printer.render(&scene("Q2 4:30", false)).unwrap());

        let out = String::from_utf8(printer.into_inner()).unwrap();
        assert_eq!(
            out,
            "MIN DEN\n 12   8\nQ2 4:45\nEdwards dunk\n\nMIN DEN\n 12   8\nQ2 4:30\nEdwards dunk\n\n"
        );
    }

    #[test]
    fn changed_scene_prints_even_when_lines_match() {
        let mut printer = Printer::new(Vec::new());
        printer.render(&scene("Q2 4:45", false)).unwrap();
        assert!(printer.render(&scene("Q2 4:45", true)).unwrap());
    }
}
