use crate::db::Database;
use crate::error::Result;
use rusqlite::{params, OptionalExtension, Row};

/// Data-level record of a saved location. The `(lat, lon)` pair is the
/// primary key; see the schema in `migrations.rs`.
#[derive(Debug, Clone, PartialEq)]
pub struct FavouriteCity {
    pub name: String,
    pub state: Option<String>,
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Database {
    /// Upsert by coordinates: an existing favourite at the same `(lat, lon)`
    /// gets its name, state and country overwritten.
    pub fn insert_favourite_city(&self, city: &FavouriteCity) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                r#"
                INSERT OR REPLACE INTO favourite_cities (name, state, country, lat, lon)
                VALUES (?1, ?2, ?3, ?4, ?5)
                "#,
                params![
                    city.name,
                    city.state,
                    city.country,
                    city.latitude,
                    city.longitude,
                ],
            )?;
            Ok(())
        })
    }

    /// Remove the favourite at the given coordinates. Deleting a row that is
    /// not present is a no-op.
    pub fn delete_favourite_city(&self, latitude: f64, longitude: f64) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "DELETE FROM favourite_cities WHERE lat = ?1 AND lon = ?2",
                params![latitude, longitude],
            )?;
            Ok(())
        })
    }

    pub fn get_favourite_cities(&self) -> Result<Vec<FavouriteCity>> {
        self.with_conn(|conn| {
            let mut stmt =
                conn.prepare("SELECT * FROM favourite_cities ORDER BY name, country")?;
            let cities = stmt
                .query_map([], row_to_favourite_city)?
                .filter_map(|r| r.ok())
                .collect();
            Ok(cities)
        })
    }

    pub fn get_favourite_city_by_coordinates(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<Option<FavouriteCity>> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT * FROM favourite_cities WHERE lat = ?1 AND lon = ?2",
                params![latitude, longitude],
                row_to_favourite_city,
            )
            .optional()
            .map_err(Into::into)
        })
    }
}

fn row_to_favourite_city(row: &Row) -> rusqlite::Result<FavouriteCity> {
    Ok(FavouriteCity {
        name: row.get("name")?,
        state: row.get("state")?,
        country: row.get("country")?,
        latitude: row.get("lat")?,
        longitude: row.get("lon")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_city() -> FavouriteCity {
        FavouriteCity {
            name: "London".into(),
            state: None,
            country: "GB".into(),
            latitude: 51.5085,
            longitude: -0.1257,
        }
    }

    #[test]
    fn insert_and_list() {
        let db = Database::open_in_memory().unwrap();
        db.insert_favourite_city(&sample_city()).unwrap();

        let cities = db.get_favourite_cities().unwrap();
        assert_eq!(cities, vec![sample_city()]);
    }

    #[test]
    fn insert_at_existing_coordinates_overwrites() {
        let db = Database::open_in_memory().unwrap();
        db.insert_favourite_city(&sample_city()).unwrap();

        let renamed = FavouriteCity {
            name: "City of London".into(),
            ..sample_city()
        };
        db.insert_favourite_city(&renamed).unwrap();

        let cities = db.get_favourite_cities().unwrap();
        assert_eq!(cities.len(), 1);
        assert_eq!(cities[0].name, "City of London");
    }

    #[test]
    fn delete_removes_by_coordinates() {
        let db = Database::open_in_memory().unwrap();
        db.insert_favourite_city(&sample_city()).unwrap();
        db.delete_favourite_city(51.5085, -0.1257).unwrap();
        assert!(db.get_favourite_cities().unwrap().is_empty());
    }

    #[test]
    fn delete_of_absent_row_is_noop() {
        let db = Database::open_in_memory().unwrap();
        db.insert_favourite_city(&sample_city()).unwrap();
        db.delete_favourite_city(0.0, 0.0).unwrap();
        assert_eq!(db.get_favourite_cities().unwrap().len(), 1);
    }

    #[test]
    fn point_lookup_by_coordinates() {
        let db = Database::open_in_memory().unwrap();
        db.insert_favourite_city(&sample_city()).unwrap();

        let found = db
            .get_favourite_city_by_coordinates(51.5085, -0.1257)
            .unwrap();
        assert_eq!(found, Some(sample_city()));

        let missing = db.get_favourite_city_by_coordinates(1.0, 2.0).unwrap();
        assert_eq!(missing, None);
    }
}
