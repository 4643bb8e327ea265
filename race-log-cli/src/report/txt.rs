//! Plain-text results block

use race_log_decoder::{CompetitorResult, Split};

/// Render the `Final results:` block, one line per competitor
pub fn render(results: &[CompetitorResult]) -> String {
    let mut out = String::from("Final results:\n");
    for result in results {
        out.push_str(&render_line(result));
        out.push('\n');
    }
    out
}

/// `<status> Competitor <id>: laps count <n>, laps [..], Penalty [..], Hits <h>/<cap>`
pub fn render_line(result: &CompetitorResult) -> String {
    format!(
        "{} Competitor {}: laps count {}, laps [{}], Penalty [{}], Hits {}/{}",
        result.status,
        result.competitor,
        result.laps_completed,
        join(&result.laps),
        join(&result.penalties),
        result.hits,
        result.hit_capacity
    )
}

fn join(splits: &[Split]) -> String {
    splits
        .iter()
        .map(Split::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;
    use race_log_decoder::{Phase, Speed, Status};

    fn result() -> CompetitorResult {
        CompetitorResult {
            competitor: 1,
            status: Status::Finished {
                elapsed: TimeDelta::minutes(10),
            },
            phase: Phase::Finished,
            laps_completed: 2,
            laps: vec![Split {
                duration: TimeDelta::minutes(10),
                speed: Speed::Defined(3500.0 / 600.0),
            }],
            penalties: vec![
                Split {
                    duration: TimeDelta::seconds(30),
                    speed: Speed::Defined(5.0),
                },
                Split {
                    duration: TimeDelta::zero(),
                    speed: Speed::Undefined,
                },
            ],
            hits: 4,
            hit_capacity: 10,
        }
    }

    #[test]
    fn test_render_line() {
        assert_eq!(
            render_line(&result()),
            "[00:10:00.000] Competitor 1: laps count 2, laps [{00:10:00.000, 5.833}], \
             Penalty [{00:00:30.000, 5.000}, {00:00:00.000, undefined}], Hits 4/10"
        );
    }

    #[test]
    fn test_render_block() {
        let mut dnf = result();
        dnf.competitor = 2;
        dnf.status = Status::NotFinished;
        dnf.laps.clear();
        dnf.penalties.clear();

        let text = render(&[result(), dnf]);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Final results:");
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[2],
            "[NotFinished] Competitor 2: laps count 2, laps [], Penalty [], Hits 4/10"
        );
    }
}
