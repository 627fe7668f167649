//! Objects to manage stored locations and the store that holds them
use crate::{
    Database,
    core::query::{
        DynFilterPart, SortOrder, SortSpec, SortSpecs, ToSql,
        filter::{Cmp, FilterPart, and, or},
    },
    error::{Error, Result},
    geo::{BoundingBox, Coordinate},
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::{QueryBuilder, Sqlite};
use tracing::debug;

/// A type for specifying fields that can be used for filtering a database query
/// for locations
#[derive(Clone)]
pub enum Filter {
    /// Match the ID of the location to the given value
    Id(i64),

    /// Match the category of the location exactly (case-sensitive)
    Category(String),

    /// Compare the name of the location to the given value
    Name(Cmp, String),

    /// Compare the latitude of the location to the given value
    Latitude(Cmp, f64),

    /// Compare the longitude of the location to the given value
    Longitude(Cmp, f64),
}

impl FilterPart for Filter {
    fn add_to_query(&self, builder: &mut QueryBuilder<Sqlite>) {
        match self {
            Self::Id(id) => _ = builder.push(" L.locid = ").push_bind(*id),
            Self::Category(category) => {
                _ = builder.push(" L.category = ").push_bind(category.clone())
            }
            Self::Name(cmp, frag) => {
                let s = match cmp {
                    Cmp::Like => format!("%{frag}%"),
                    _ => frag.to_string(),
                };
                builder.push(" L.locname ").push(cmp).push_bind(s);
            }
            Self::Latitude(cmp, value) => {
                _ = builder.push(" L.latitude ").push(cmp).push_bind(*value)
            }
            Self::Longitude(cmp, value) => {
                _ = builder.push(" L.longitude ").push(cmp).push_bind(*value)
            }
        }
    }
}

/// Builds a filter that matches locations inside the given box. Boxes that
/// wrap around the antimeridian match on either side of it.
pub fn bounding_box_filter(bbox: &BoundingBox) -> DynFilterPart {
    let longitude = if bbox.crosses_antimeridian() {
        or()
    } else {
        and()
    }
    .push(Filter::Longitude(Cmp::NotLessThan, bbox.min_longitude))
    .push(Filter::Longitude(Cmp::NotGreaterThan, bbox.max_longitude))
    .build();
    and()
        .push(Filter::Latitude(Cmp::NotLessThan, bbox.min_latitude))
        .push(Filter::Latitude(Cmp::NotGreaterThan, bbox.max_latitude))
        .push(longitude)
        .build()
}

/// Fields that location queries can be sorted on
#[derive(Clone, Copy, Debug)]
pub enum SortField {
    Id,
    Name,
    Category,
}

impl ToSql for SortField {
    fn to_sql(&self) -> String {
        match self {
            Self::Id => "L.locid",
            Self::Name => "L.locname",
            Self::Category => "L.category",
        }
        .to_string()
    }
}

/// A named place with a position and a category, as stored in the database
#[derive(Debug, sqlx::FromRow, Deserialize, Serialize, PartialEq, Clone)]
pub struct Location {
    /// A unique ID that identifies this location in the store
    #[sqlx(rename = "locid")]
    pub id: i64,

    #[sqlx(rename = "locname")]
    pub name: String,

    #[sqlx(default)]
    pub address: Option<String>,

    pub latitude: f64,

    pub longitude: f64,

    /// Free-form, case-sensitive tag such as "cafe" or "restaurant"
    pub category: String,
}

impl Location {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }

    fn build_query(
        filter: Option<DynFilterPart>,
        sort: Option<SortSpecs<SortField>>,
    ) -> QueryBuilder<'static, Sqlite> {
        let mut qb = QueryBuilder::new(
            r#"SELECT L.locid, L.locname, L.address, L.latitude, L.longitude, L.category
            FROM nb_locations L"#,
        );
        if let Some(f) = filter {
            qb.push(" WHERE ");
            f.add_to_query(&mut qb);
        }
        let sort = sort.unwrap_or_else(|| SortField::Id.into());
        qb.push(" ");
        qb.push(sort.to_sql());
        qb
    }

    /// Loads all matching locations from the database
    pub async fn load_all(
        filter: Option<DynFilterPart>,
        sort: Option<SortSpecs<SortField>>,
        db: &Database,
    ) -> Result<Vec<Location>> {
        Self::build_query(filter, sort)
            .build_query_as()
            .fetch_all(db.pool())
            .await
            .map_err(Into::into)
    }

    /// Loads the location with the given id, or [Error::NotFound] if it doesn't exist
    pub async fn load(id: i64, db: &Database) -> Result<Location> {
        Self::build_query(Some(Filter::Id(id).into()), None)
            .build_query_as()
            .fetch_optional(db.pool())
            .await?
            .ok_or_else(|| Error::NotFound(format!("location {id}")))
    }
}

/// The data needed to create a new [Location]. The id is assigned by the store.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct NewLocation {
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub category: String,
}

impl NewLocation {
    pub fn new(
        name: String,
        address: Option<String>,
        latitude: f64,
        longitude: f64,
        category: String,
    ) -> Self {
        Self {
            name,
            address,
            latitude,
            longitude,
            category,
        }
    }

    /// Checks that all required fields are present and that the coordinates
    /// are within range
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::Validation("name is required".to_string()));
        }
        if self.category.trim().is_empty() {
            return Err(Error::Validation("category is required".to_string()));
        }
        if !self.latitude.is_finite() || !(-90.0..=90.0).contains(&self.latitude) {
            return Err(Error::Validation(format!(
                "latitude {} is outside of [-90, 90]",
                self.latitude
            )));
        }
        if !self.longitude.is_finite() || !(-180.0..=180.0).contains(&self.longitude) {
            return Err(Error::Validation(format!(
                "longitude {} is outside of [-180, 180]",
                self.longitude
            )));
        }
        Ok(())
    }
}

/// A persistent collection of locations that can be queried by category and by
/// a rectangular area
#[async_trait]
pub trait LocationStore: Send + Sync {
    /// Add a new location to the store and return its id
    async fn insert(&self, location: &NewLocation) -> Result<i64>;

    /// All locations with exactly the given category that lie inside the
    /// (inclusive) bounding box
    async fn query_by_category_and_bounding_box(
        &self,
        category: &str,
        bbox: &BoundingBox,
    ) -> Result<Vec<Location>>;

    /// All locations with exactly the given category, ordered by id
    async fn query_by_category(&self, category: &str) -> Result<Vec<Location>>;

    async fn get_by_id(&self, id: i64) -> Result<Location>;
}

#[async_trait]
impl LocationStore for Database {
    async fn insert(&self, location: &NewLocation) -> Result<i64> {
        location.validate()?;
        let res = sqlx::query(
            r#"INSERT INTO nb_locations
          (locname, address, latitude, longitude, category)
          VALUES (?, ?, ?, ?, ?)"#,
        )
        .bind(&location.name)
        .bind(&location.address)
        .bind(location.latitude)
        .bind(location.longitude)
        .bind(&location.category)
        .execute(self.pool())
        .await?;
        let id = res.last_insert_rowid();
        debug!(id, category = %location.category, "inserted location");
        Ok(id)
    }

    async fn query_by_category_and_bounding_box(
        &self,
        category: &str,
        bbox: &BoundingBox,
    ) -> Result<Vec<Location>> {
        let filter = and()
            .push(Filter::Category(category.to_string()))
            .push(bounding_box_filter(bbox))
            .build();
        Location::load_all(Some(filter), None, self).await
    }

    async fn query_by_category(&self, category: &str) -> Result<Vec<Location>> {
        Location::load_all(
            Some(Filter::Category(category.to_string()).into()),
            Some(SortSpec::new(SortField::Id, SortOrder::Ascending).into()),
            self,
        )
        .await
    }

    async fn get_by_id(&self, id: i64) -> Result<Location> {
        Location::load(id, self).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::Pool;
    use test_log::test;

    #[test(sqlx::test(
        migrations = "../db/migrations/",
        fixtures(path = "../../db/fixtures", scripts("locations"))
    ))]
    async fn test_query_by_category(pool: Pool<Sqlite>) {
        let db = Database::from(pool);
        let cafes = db.query_by_category("cafe").await.expect("query failed");
        let ids: Vec<i64> = cafes.iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);

        // matching is case-sensitive
        let cafes = db.query_by_category("Cafe").await.expect("query failed");
        assert_eq!(cafes.len(), 1);
        assert_eq!(cafes[0].name, "Cafe Lower");

        let none = db.query_by_category("museum").await.expect("query failed");
        assert!(none.is_empty());
    }

    #[test(sqlx::test(
        migrations = "../db/migrations/",
        fixtures(path = "../../db/fixtures", scripts("locations"))
    ))]
    async fn test_query_by_bounding_box(pool: Pool<Sqlite>) {
        let db = Database::from(pool);
        let center = Coordinate::new(12.9716, 77.5946);
        let bbox = BoundingBox::around(&center, 5.0);
        let found = db
            .query_by_category_and_bounding_box("cafe", &bbox)
            .await
            .expect("query failed");
        let ids: Vec<i64> = found.iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![1, 3]);

        let bbox = BoundingBox::around(&center, 400.0);
        let found = db
            .query_by_category_and_bounding_box("cafe", &bbox)
            .await
            .expect("query failed");
        assert_eq!(found.len(), 3);
    }

    #[test(sqlx::test(migrations = "../db/migrations/"))]
    async fn test_bounding_box_across_antimeridian(pool: Pool<Sqlite>) {
        let db = Database::from(pool);
        let west = db
            .insert(&NewLocation::new(
                "Taveuni".into(),
                None,
                -16.8,
                -179.95,
                "island".into(),
            ))
            .await
            .expect("insert failed");
        let east = db
            .insert(&NewLocation::new(
                "Vanua Levu".into(),
                None,
                -16.8,
                179.95,
                "island".into(),
            ))
            .await
            .expect("insert failed");
        db.insert(&NewLocation::new(
            "Greenwich".into(),
            None,
            51.48,
            0.0,
            "island".into(),
        ))
        .await
        .expect("insert failed");

        let bbox = BoundingBox::around(&Coordinate::new(-16.8, 179.99), 20.0);
        assert!(bbox.crosses_antimeridian());
        let found = db
            .query_by_category_and_bounding_box("island", &bbox)
            .await
            .expect("query failed");
        let ids: Vec<i64> = found.iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![west, east]);
    }

    #[test(sqlx::test(migrations = "../db/migrations/"))]
    async fn test_insert_and_get(pool: Pool<Sqlite>) {
        let db = Database::from(pool);
        let new = NewLocation::new(
            "Cafe A".into(),
            Some("MG Road".into()),
            12.9716,
            77.5946,
            "cafe".into(),
        );
        let id = db.insert(&new).await.expect("failed to insert");
        let loaded = db.get_by_id(id).await.expect("failed to load");
        assert_eq!(
            loaded,
            Location {
                id,
                name: "Cafe A".into(),
                address: Some("MG Road".into()),
                latitude: 12.9716,
                longitude: 77.5946,
                category: "cafe".into(),
            }
        );

        let second = db
            .insert(&NewLocation::new(
                "Cafe B".into(),
                None,
                13.0827,
                80.2707,
                "cafe".into(),
            ))
            .await
            .expect("failed to insert");
        assert_ne!(id, second);

        assert!(matches!(db.get_by_id(9999).await, Err(Error::NotFound(_))));
    }

    #[test(sqlx::test(migrations = "../db/migrations/"))]
    async fn test_insert_validation(pool: Pool<Sqlite>) {
        let db = Database::from(pool);
        let cases = [
            NewLocation::new("".into(), None, 0.0, 0.0, "cafe".into()),
            NewLocation::new("x".into(), None, 0.0, 0.0, " ".into()),
            NewLocation::new("x".into(), None, 90.5, 0.0, "cafe".into()),
            NewLocation::new("x".into(), None, 0.0, -180.1, "cafe".into()),
            NewLocation::new("x".into(), None, f64::NAN, 0.0, "cafe".into()),
        ];
        for case in cases {
            assert!(
                matches!(db.insert(&case).await, Err(Error::Validation(_))),
                "expected validation error for {case:?}"
            );
        }
        assert!(db.query_by_category("cafe").await.unwrap().is_empty());
    }

    #[test(sqlx::test(
        migrations = "../db/migrations/",
        fixtures(path = "../../db/fixtures", scripts("locations"))
    ))]
    async fn test_load_all_sorted(pool: Pool<Sqlite>) {
        let db = Database::from(pool);
        let all = Location::load_all(
            Some(Filter::Name(Cmp::Like, "Cafe".into()).into()),
            Some(SortSpec::new(SortField::Name, SortOrder::Descending).into()),
            &db,
        )
        .await
        .expect("query failed");
        let names: Vec<&str> = all.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["Cafe Lower", "Cafe C", "Cafe B", "Cafe A"]);

        let exact = Location::load_all(
            Some(Filter::Name(Cmp::Equal, "Cafe B".into()).into()),
            None,
            &db,
        )
        .await
        .expect("query failed");
        assert_eq!(exact.len(), 1);
        assert_eq!(exact[0].id, 2);
    }
}
