use tabled::{Table, settings::Style};

/// Applies the common look of all tables printed by the tool
pub(crate) trait NearbyctlTable {
    fn styled(&mut self) -> &mut Self;
}

impl NearbyctlTable for Table {
    fn styled(&mut self) -> &mut Self {
        self.with(Style::psql())
    }
}
