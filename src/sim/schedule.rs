use super::{EngineState, SIM_DURATION};
use rand::rngs::StdRng;
use rand::Rng;

/// One dwell window of the state schedule. `end` is the simulation time
/// at which the next segment takes over.
#[derive(Debug, Clone, Copy)]
pub struct Segment {
    pub state: EngineState,
    pub end: f64,
}

// Fixed tour with randomized dwell times. The dwell maxima sum to 43
// units, so the closing idle segment always gets at least 2 units.
const TOUR: [(EngineState, f64, f64); 5] = [
    (EngineState::Idle, 3.0, 6.0),
    (EngineState::Cruise, 6.0, 10.0),
    (EngineState::Acceleration, 8.0, 12.0),
    (EngineState::Cruise, 4.0, 8.0),
    (EngineState::Deceleration, 4.0, 7.0),
];

/// Builds the schedule for one 45-unit run: every state is visited, the
/// run starts and ends idling, and segment boundaries depend only on the
/// seeded generator.
pub fn build(rng: &mut StdRng) -> Vec<Segment> {
    let mut segments = Vec::with_capacity(TOUR.len() + 1);
    let mut t = 0.0;
    for (state, dwell_min, dwell_max) in TOUR.iter() {
        t += rng.gen_range(*dwell_min..=*dwell_max);
        segments.push(Segment { state: *state, end: t });
    }
    // closing idle absorbs whatever is left of the run
    segments.push(Segment {
        state: EngineState::Idle,
        end: SIM_DURATION,
    });
    segments
}

/// State active at simulation time `t`.
pub fn state_at(segments: &[Segment], t: f64) -> EngineState {
    segments
        .iter()
        .find(|segment| t < segment.end)
        .map(|segment| segment.state)
        .unwrap_or(EngineState::Idle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn covers_the_full_run() {
        for seed in 0..32 {
            let mut rng = StdRng::seed_from_u64(seed);
            let segments = build(&mut rng);
            assert_eq!(segments.last().unwrap().end, SIM_DURATION);
            assert_eq!(segments.first().unwrap().state, EngineState::Idle);
            assert_eq!(segments.last().unwrap().state, EngineState::Idle);
            let mut last_end = 0.0;
            for segment in segments.iter() {
                assert!(segment.end > last_end);
                last_end = segment.end;
            }
        }
    }

    #[test]
    fn visits_every_state() {
        let mut rng = StdRng::seed_from_u64(7);
        let segments = build(&mut rng);
        for state in [
            EngineState::Idle,
            EngineState::Cruise,
            EngineState::Acceleration,
            EngineState::Deceleration,
        ]
        .iter()
        {
            assert!(segments.iter().any(|s| s.state == *state));
        }
    }

    #[test]
    fn lookup_follows_segment_boundaries() {
        let segments = vec![
            Segment { state: EngineState::Idle, end: 5.0 },
            Segment { state: EngineState::Cruise, end: 45.0 },
        ];
        assert_eq!(state_at(&segments, 0.0), EngineState::Idle);
        assert_eq!(state_at(&segments, 4.9), EngineState::Idle);
        assert_eq!(state_at(&segments, 5.0), EngineState::Cruise);
        assert_eq!(state_at(&segments, 44.9), EngineState::Cruise);
        // past the schedule falls back to idle
        assert_eq!(state_at(&segments, 45.0), EngineState::Idle);
    }
}
