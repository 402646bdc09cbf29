use bitflags::bitflags;

bitflags! {
    /// Pending rebuild reason for a column. Empty means unscheduled.
    ///
    /// `BORDER` limits the rebuild to the section perimeter (a neighboring
    /// chunk changed); `SCHEDULED` marks a block edit; `LIGHTING` rides
    /// along when light values moved.
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub struct ScheduleType: u8 {
        const FULL = 0b0001;
        const BORDER = 0b0010;
        const LIGHTING = 0b0100;
        const SCHEDULED = 0b1000;
    }
}

impl ScheduleType {
    #[inline]
    pub fn is_unscheduled(self) -> bool {
        self.is_empty()
    }

    /// Border-only rebuild: the cheap perimeter path applies only when no
    /// stronger reason is pending.
    #[inline]
    pub fn is_border_only(self) -> bool {
        self.contains(ScheduleType::BORDER)
            && !self.intersects(ScheduleType::FULL | ScheduleType::SCHEDULED)
    }
}

impl Default for ScheduleType {
    fn default() -> Self {
        ScheduleType::empty()
    }
}
