use super::grid::GridAxis;
use super::time::TimeOfDay;

/// Index of the row `target` belongs to, or `None` when it falls outside the
/// axis.
///
/// The first row at or after `target` wins unless it is more than half an
/// interval away, in which case the row before it is used. Exactly half an
/// interval still picks the later row. A target past the closing row, or more
/// than half an interval before the opening row, does not snap.
pub fn snap(target: TimeOfDay, axis: &GridAxis, interval: u32) -> Option<usize> {
    let rows = axis.rows();
    let next = rows.iter().position(|row| *row >= target)?;
    if rows[next] == target {
        return Some(next);
    }
    let gap = u32::from(rows[next].minutes() - target.minutes());
    // Compare doubled values so odd intervals keep their half minute.
    if 2 * gap > interval {
        next.checked_sub(1)
    } else {
        Some(next)
    }
}
