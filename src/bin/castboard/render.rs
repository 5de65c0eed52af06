//! Plain-text rendering of a cast grid.

use castboard::CastGrid;

/// Renders one block per position, one line per row, one column per sub-cast.
pub fn render_grid(grid: &CastGrid) -> String {
    let mut out = String::new();
    out.push_str(&format!("{:<24}", ""));
    for header in grid.headers() {
        out.push_str(&format!("{:<24}", header));
    }
    out.push('\n');

    for grid_pos in grid.positions() {
        let title = if grid_pos.position.name.is_empty() {
            grid_pos.position.uuid.as_str()
        } else {
            grid_pos.position.name.as_str()
        };
        out.push_str(&format!("{}\n", title));
        for (row_index, row) in grid_pos.rows.iter().enumerate() {
            out.push_str(&format!("  {:<22}", row_index + 1));
            for slot in &row.slots {
                let cell = match slot {
                    Some(d) => {
                        let name = d
                            .dancer
                            .as_ref()
                            .map(|dancer| dancer.display_name())
                            .unwrap_or_else(|| d.uuid.clone());
                        if d.has_absence {
                            format!("{name} (absent)")
                        } else {
                            name
                        }
                    }
                    None => "-".to_string(),
                };
                out.push_str(&format!("{:<24}", cell));
            }
            out.push('\n');
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use castboard::{
        BuildOptions, Cast, CastGroup, CastMember, Dancer, DancerRoster, FilledPosition,
        Position, Segment,
    };

    #[test]
    fn test_render_grid() {
        let segment = Segment::new("s1", "Waltz")
            .with_position(Position::new("p1", 0, 2).with_name("Lead"));
        let dancers = DancerRoster::new(vec![Dancer::new("d1", "Ana", "Pavlova")]);
        let cast = Cast::new("c1", "A", "s1").with_cast_count(2).with_filled_position(
            FilledPosition::new("p1")
                .with_group(CastGroup::new(1).with_member(CastMember::new("d1", 1))),
        );
        let grid = CastGrid::build(&cast, &segment, &dancers, BuildOptions::default());

        let text = render_grid(&grid);
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].contains("1st Cast") && lines[0].contains("2nd Cast"));
        assert_eq!(lines[1], "Lead");
        assert!(lines[3].contains("Ana Pavlova"));
        assert!(!lines[2].contains("Ana"));
    }
}
