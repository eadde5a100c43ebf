// Copyright (c) 2020 White Leaf
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT

use prettytable::{format::consts::FORMAT_NO_LINESEP, row, table, Table};
use std::collections::HashMap;

pub trait Entity {
    type Id;

    fn get_id(&self) -> Self::Id;

    /// Displayable fields, in the order they should be shown
    fn get_data(&self) -> Vec<(&'static str, String)> {
        Default::default()
    }
}

pub trait ToTable {
    fn to_table(&self) -> Table;
}

impl<I: ToString, E: Entity<Id = I>> ToTable for E {
    fn to_table(&self) -> Table {
        let mut table = table![["id", self.get_id()]];

        for (key, val) in self.get_data() {
            table.add_row(row![key, val]);
        }

        table.set_format(*FORMAT_NO_LINESEP);
        table
    }
}

impl<K, V, B> ToTable for HashMap<K, V, B>
where
    K: ToString + Ord,
    V: ToString,
{
    fn to_table(&self) -> Table {
        let mut table = Table::new();

        let mut entries: Vec<_> = self.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));

        for (key, val) in entries {
            table.add_row(row![key, val]);
        }

        table.set_format(*FORMAT_NO_LINESEP);
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Movie;

    #[test]
    fn entity_table_has_id_and_fields() {
        let movie = Movie {
            id: 7,
            title: "Toy Story (1995)".into(),
            released_at: None,
            imdb_url: None,
        };

        let table = movie.to_table();
        assert_eq!(table.len(), 2);

        let rendered = table.to_string();
        assert!(rendered.contains("Toy Story (1995)"));
        assert!(rendered.contains('7'));
    }

    #[test]
    fn ratings_table_is_sorted() {
        let mut ratings = HashMap::new();
        ratings.insert(3, 1.0);
        ratings.insert(1, 5.0);
        ratings.insert(2, 4.0);

        let table = ratings.to_table();
        let keys: Vec<String> = table
            .row_iter()
            .map(|row| row.get_cell(0).map(|cell| cell.get_content()).unwrap_or_default())
            .collect();
        let scores: Vec<String> = table
            .row_iter()
            .map(|row| row.get_cell(1).map(|cell| cell.get_content()).unwrap_or_default())
            .collect();

        assert_eq!(keys, vec!["1", "2", "3"]);
        assert_eq!(scores, vec!["5", "4", "1"]);
    }
}
