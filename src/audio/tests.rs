use super::rules::{EndedAction, on_ended, playback_order, should_start, step};
use super::types::PlayState;

#[test]
fn step_wraps_in_both_directions() {
    let order: Vec<usize> = (0..3).collect();
    assert_eq!(step(&order, 0, 1), 1);
    assert_eq!(step(&order, 2, 1), 0);
    assert_eq!(step(&order, 0, -1), 2);
    assert_eq!(step(&order, 1, -1), 0);
}

#[test]
fn stepping_forward_len_times_is_the_identity() {
    for len in [1usize, 2, 3, 7] {
        let order: Vec<usize> = (0..len).collect();
        for start in 0..len {
            let mut i = start;
            for _ in 0..len {
                i = step(&order, i, 1);
            }
            assert_eq!(i, start);
        }
    }
}

#[test]
fn step_follows_a_custom_order() {
    let order = vec![2usize, 0, 1];
    assert_eq!(step(&order, 2, 1), 0);
    assert_eq!(step(&order, 0, 1), 1);
    assert_eq!(step(&order, 1, 1), 2);
    assert_eq!(step(&order, 2, -1), 1);
}

#[test]
fn step_next_twice_then_prev_lands_one_ahead() {
    let order: Vec<usize> = (0..3).collect();
    let mut i = 0usize;
    i = step(&order, i, 1);
    i = step(&order, i, 1);
    i = step(&order, i, -1);
    assert_eq!(i, 1);
}

#[test]
fn ended_restarts_when_repeat_one_is_set() {
    assert_eq!(on_ended(3, true), EndedAction::RestartCurrent);
    assert_eq!(on_ended(1, true), EndedAction::RestartCurrent);
}

#[test]
fn ended_advances_through_longer_playlists() {
    assert_eq!(on_ended(2, false), EndedAction::Advance);
    assert_eq!(on_ended(10, false), EndedAction::Advance);
}

#[test]
fn ended_on_a_single_track_without_repeat_stops() {
    // No self-advance loop back onto the same track.
    assert_eq!(on_ended(1, false), EndedAction::StopHere);
}

#[test]
fn resume_is_idempotent_while_playing() {
    assert!(should_start(PlayState::Idle));
    assert!(should_start(PlayState::Paused));
    assert!(!should_start(PlayState::Playing));
}

#[test]
fn playback_order_is_a_permutation() {
    let identity = playback_order(5, false);
    assert_eq!(identity, vec![0, 1, 2, 3, 4]);

    let mut shuffled = playback_order(5, true);
    shuffled.sort_unstable();
    assert_eq!(shuffled, vec![0, 1, 2, 3, 4]);
}
