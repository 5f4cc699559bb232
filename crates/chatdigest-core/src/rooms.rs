/// Sentinel printed when no room matches.
pub const NO_MATCH: &str = "null";

/// A row of the chat-room listing. Columns are positional: 0 is the id, 2 the display name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoomRow<'a> {
    pub id: &'a str,
    pub name: &'a str,
}

/// Splits the listing into rows, skipping the header and rows with fewer than three columns.
///
/// Fields are split on every literal comma; quoted fields are not recognised.
pub fn parse_listing(listing: &str) -> Vec<RoomRow<'_>> {
    listing
        .trim()
        .split('\n')
        .skip(1)
        .filter_map(|line| {
            let cols: Vec<&str> = line.trim_end_matches('\r').split(',').collect();
            (cols.len() >= 3).then(|| RoomRow {
                id: cols[0],
                name: cols[2],
            })
        })
        .collect()
}

/// First room id whose display name contains `term`, case-insensitively.
pub fn find_room_id(listing: &str, term: &str) -> Option<String> {
    let needle = term.to_lowercase();
    parse_listing(listing)
        .into_iter()
        .find(|row| row.name.to_lowercase().contains(&needle))
        .map(|row| row.id.to_string())
}
