use super::*;

#[test]
fn three_quick_clicks_cap_at_three() {
    let mut c = ClickCounter::new();
    assert_eq!(c.handle_click(4, 0.0), 1);
    assert_eq!(c.handle_click(4, 100.0), 2);
    assert_eq!(c.handle_click(4, 200.0), 3);
    assert_eq!(c.handle_click(4, 300.0), 3);
    assert_eq!(c.times_clicked(), 3);
}

#[test]
fn moving_or_waiting_starts_a_new_gesture() {
    let mut c = ClickCounter::new();
    c.handle_click(4, 0.0);
    assert_eq!(c.handle_click(5, 50.0), 1);
    assert_eq!(c.handle_click(5, 450.0), 1);
    assert_eq!(c.handle_click(5, 849.0), 2);
}

#[test]
fn reset_clears_the_gesture() {
    let mut c = ClickCounter::new();
    c.handle_click(1, 0.0);
    c.handle_click(1, 10.0);
    c.reset_state();
    assert_eq!(c.times_clicked(), 0);
    assert_eq!(c.handle_click(1, 20.0), 1);
}
