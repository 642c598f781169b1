use crate::achievements::AchievementStatus;

/// Transitions of the achievement verification lifecycle
pub struct StatusMachine;

impl StatusMachine {
    /// Check if a status transition is valid
    ///
    /// # Valid Transitions
    /// - Pending → Approved, Rejected
    /// - Approved, Rejected → (terminal, nothing allowed)
    ///
    /// Unlike order statuses, re-applying the current status is not a no-op:
    /// a second verification of the same record is refused.
    pub fn is_valid_transition(from: AchievementStatus, to: AchievementStatus) -> bool {
        matches!(
            (from, to),
            (AchievementStatus::Pending, AchievementStatus::Approved)
                | (AchievementStatus::Pending, AchievementStatus::Rejected)
        )
    }

    /// Attempt to transition from one status to another
    ///
    /// # Returns
    /// `Ok(to)` if the transition is valid, `Err(message)` otherwise
    pub fn transition(
        from: AchievementStatus,
        to: AchievementStatus,
    ) -> Result<AchievementStatus, String> {
        if Self::is_valid_transition(from, to) {
            Ok(to)
        } else {
            Err(format!(
                "Invalid status transition from {} to {}",
                from, to
            ))
        }
    }
}
