/// This library uses a simple discrete time model.
pub type Time = u64;

/// Syntactic sugar to give a hint that a time value indicates a
/// point in time or some offset.
pub type Instant = Time;

/// Syntactic sugar to give a hint that a time value denotes an
/// interval length.
pub type Duration = Time;

/// Syntactic sugar to give a hint that a time value represents some
/// amount of processor service.
pub type Service = Time;

/// Greatest common divisor; `gcd(0, b) == b`.
pub fn gcd(a: Time, b: Time) -> Time {
    let (mut a, mut b) = (a, b);
    while b != 0 {
        let r = a % b;
        a = b;
        b = r;
    }
    a
}

/// Least common multiple, or `None` if it does not fit into [Time].
pub fn checked_lcm(a: Time, b: Time) -> Option<Time> {
    if a == 0 || b == 0 {
        return Some(0);
    }
    (a / gcd(a, b)).checked_mul(b)
}

// common helper function
pub(crate) fn divide_with_ceil(a: Duration, b: Duration) -> u64 {
    a / b + (a % b > 0) as u64
}
