//! Cross-entity fuzzy search.
//!
//! One query fans out over categories, brands, products, projects and two
//! user populations (general users, product sellers), each with its own
//! pagination metadata. All section queries run concurrently and the call
//! is all-or-nothing: a single failing section fails the whole search.

use makaan_common::{AppResult, PageWindow, Paginated};
use makaan_db::{
    entities::{brand, category, product, project, user},
    repositories::{
        BrandRepository, CategoryRepository, ProductRepository, ProjectRepository, UserRepository,
    },
};
use std::collections::HashMap;

use super::user::UserWithListings;
use super::visibility::VisibilityService;

/// Build the case-insensitive subsequence pattern for a query.
///
/// Regex metacharacters are escaped first, then the characters are joined
/// with `.*`: `"wd"` becomes `w.*d` and matches `"wood"`. Escaping before
/// joining means a literal `.` or `*` in the query can never produce a
/// malformed or over-matching pattern. All fuzzy matching in the system
/// goes through this one function.
#[must_use]
pub fn fuzzy_pattern(query: &str) -> String {
    query
        .chars()
        .map(escape_char)
        .collect::<Vec<_>>()
        .join(".*")
}

const METACHARACTERS: &str = "\\^$.|?*+()[]{}-/";

fn escape_char(c: char) -> String {
    if METACHARACTERS.contains(c) {
        format!("\\{c}")
    } else {
        c.to_string()
    }
}

/// A project hit with its owner populated.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ProjectWithOwner {
    #[serde(flatten)]
    pub project: project::Model,
    pub owner: Option<user::Model>,
}

/// A product hit with its brand populated.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ProductWithBrand {
    #[serde(flatten)]
    pub product: product::Model,
    pub brand: Option<brand::Model>,
}

/// The assembled multi-section search result.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResults {
    pub categories: Paginated<category::Model>,
    pub brands: Paginated<brand::Model>,
    pub products: Paginated<ProductWithBrand>,
    pub projects: Paginated<ProjectWithOwner>,
    pub users: Paginated<UserWithListings>,
    pub product_sellers: Paginated<UserWithListings>,
}

/// Search service: the cross-entity fuzzy aggregator.
#[derive(Clone)]
pub struct SearchService {
    category_repo: CategoryRepository,
    brand_repo: BrandRepository,
    product_repo: ProductRepository,
    project_repo: ProjectRepository,
    user_repo: UserRepository,
    visibility: VisibilityService,
}

impl SearchService {
    /// Create a new search service.
    #[must_use]
    pub const fn new(
        category_repo: CategoryRepository,
        brand_repo: BrandRepository,
        product_repo: ProductRepository,
        project_repo: ProjectRepository,
        user_repo: UserRepository,
        visibility: VisibilityService,
    ) -> Self {
        Self {
            category_repo,
            brand_repo,
            product_repo,
            project_repo,
            user_repo,
            visibility,
        }
    }

    /// Fuzzy-search every section.
    ///
    /// Sections are independently paginated with the same window; callers
    /// must not assume a single global `total_pages`.
    pub async fn search_all(
        &self,
        query: &str,
        viewer_id: Option<&str>,
        window: PageWindow,
    ) -> AppResult<SearchResults> {
        let pattern = fuzzy_pattern(query.trim());
        let vis = self.visibility.compute(viewer_id).await;
        let excluded = &vis.excluded_owner_ids;
        let (skip, limit) = (window.skip(), window.limit);

        // Fire every section query and count together; one failure fails
        // the whole search.
        let (
            categories,
            categories_total,
            brands,
            brands_total,
            products,
            products_total,
            projects,
            projects_total,
            users,
            users_total,
            sellers,
            sellers_total,
        ) = tokio::try_join!(
            self.category_repo.search(&pattern, skip, limit),
            self.category_repo.count_search(&pattern),
            self.brand_repo.search(&pattern, skip, limit),
            self.brand_repo.count_search(&pattern),
            self.product_repo.search(&pattern, excluded, skip, limit),
            self.product_repo.count_search(&pattern, excluded),
            self.project_repo.search(&pattern, excluded, skip, limit),
            self.project_repo.count_search(&pattern, excluded),
            self.user_repo.search(&pattern, excluded, false, skip, limit),
            self.user_repo.count_search(&pattern, excluded, false),
            self.user_repo.search(&pattern, excluded, true, skip, limit),
            self.user_repo.count_search(&pattern, excluded, true),
        )?;

        // Join phase. Children are fetched only for owners that already
        // passed the visibility filter, so a blocked owner's projects or
        // products can never surface indirectly.
        let portfolio_owner_ids: Vec<String> = users
            .iter()
            .filter(|u| u.role.has_projects())
            .map(|u| u.id.clone())
            .collect();
        let seller_ids: Vec<String> = sellers.iter().map(|u| u.id.clone()).collect();

        let (owner_projects, seller_products) = tokio::try_join!(
            self.project_repo.find_by_owners(&portfolio_owner_ids, skip, limit),
            self.product_repo
                .search_by_owners(&seller_ids, &pattern, skip, limit),
        )?;

        let users = group_listings(users, owner_projects, vec![]);
        let sellers = group_listings(sellers, vec![], seller_products);

        // Populate references on the standalone sections.
        let (projects, products) =
            tokio::try_join!(self.populate_owners(projects), self.populate_brands(products))?;

        Ok(SearchResults {
            categories: Paginated::assemble(categories, window, categories_total),
            brands: Paginated::assemble(brands, window, brands_total),
            products: Paginated::assemble(products, window, products_total),
            projects: Paginated::assemble(projects, window, projects_total),
            users: Paginated::assemble(users, window, users_total),
            product_sellers: Paginated::assemble(sellers, window, sellers_total),
        })
    }

    /// Single-section variant: product sellers with their matching products.
    pub async fn search_product_sellers(
        &self,
        query: &str,
        viewer_id: Option<&str>,
        window: PageWindow,
    ) -> AppResult<Paginated<UserWithListings>> {
        let pattern = fuzzy_pattern(query.trim());
        let vis = self.visibility.compute(viewer_id).await;
        let (skip, limit) = (window.skip(), window.limit);

        let (sellers, total) = tokio::try_join!(
            self.user_repo
                .search(&pattern, &vis.excluded_owner_ids, true, skip, limit),
            self.user_repo
                .count_search(&pattern, &vis.excluded_owner_ids, true),
        )?;

        let seller_ids: Vec<String> = sellers.iter().map(|u| u.id.clone()).collect();
        let products = self
            .product_repo
            .search_by_owners(&seller_ids, &pattern, skip, limit)
            .await?;

        Ok(Paginated::assemble(
            group_listings(sellers, vec![], products),
            window,
            total,
        ))
    }

    async fn populate_owners(
        &self,
        projects: Vec<project::Model>,
    ) -> AppResult<Vec<ProjectWithOwner>> {
        let owner_ids: Vec<String> = dedup_ids(projects.iter().map(|p| p.created_by.clone()));
        let owners: HashMap<String, user::Model> = self
            .user_repo
            .find_by_ids(&owner_ids)
            .await?
            .into_iter()
            .map(|u| (u.id.clone(), u))
            .collect();

        Ok(projects
            .into_iter()
            .map(|project| {
                let owner = owners.get(&project.created_by).cloned();
                ProjectWithOwner { project, owner }
            })
            .collect())
    }

    async fn populate_brands(
        &self,
        products: Vec<product::Model>,
    ) -> AppResult<Vec<ProductWithBrand>> {
        let brand_ids: Vec<String> = dedup_ids(products.iter().filter_map(|p| p.brand_id.clone()));
        let brands: HashMap<String, brand::Model> = self
            .brand_repo
            .find_by_ids(&brand_ids)
            .await?
            .into_iter()
            .map(|b| (b.id.clone(), b))
            .collect();

        Ok(products
            .into_iter()
            .map(|product| {
                let brand = product.brand_id.as_ref().and_then(|id| brands.get(id)).cloned();
                ProductWithBrand { product, brand }
            })
            .collect())
    }
}

/// Group child records by owner and attach them to the user records.
/// Owners with no matching children get an empty list, never a missing
/// attribute.
pub(crate) fn group_listings(
    users: Vec<user::Model>,
    projects: Vec<project::Model>,
    products: Vec<product::Model>,
) -> Vec<UserWithListings> {
    let mut projects_by_owner: HashMap<String, Vec<project::Model>> = HashMap::new();
    for p in projects {
        projects_by_owner.entry(p.created_by.clone()).or_default().push(p);
    }

    let mut products_by_owner: HashMap<String, Vec<product::Model>> = HashMap::new();
    for p in products {
        products_by_owner.entry(p.created_by.clone()).or_default().push(p);
    }

    users
        .into_iter()
        .map(|user| {
            let projects = projects_by_owner.remove(&user.id).unwrap_or_default();
            let products = products_by_owner.remove(&user.id).unwrap_or_default();
            UserWithListings {
                user,
                projects,
                products,
            }
        })
        .collect()
}

fn dedup_ids<I: Iterator<Item = String>>(ids: I) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    ids.filter(|id| seen.insert(id.clone())).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use makaan_db::entities::user::UserRole;

    #[test]
    fn test_fuzzy_pattern_joins_with_wildcards() {
        assert_eq!(fuzzy_pattern("wd"), "w.*d");
        assert_eq!(fuzzy_pattern("abc"), "a.*b.*c");
    }

    #[test]
    fn test_fuzzy_pattern_matches_subsequence() {
        let re = regex::Regex::new(&format!("(?i){}", fuzzy_pattern("wd"))).unwrap();
        assert!(re.is_match("wood"));
        assert!(re.is_match("Wide"));
        assert!(!re.is_match("draw"));
    }

    #[test]
    fn test_fuzzy_pattern_escapes_metacharacters() {
        // A literal '.' or '*' in the query must never produce a malformed
        // or over-matching pattern.
        let pattern = fuzzy_pattern("a.b");
        assert_eq!(pattern, "a.*\\..*b");
        let re = regex::Regex::new(&pattern).unwrap();
        assert!(re.is_match("a.b"));
        assert!(!re.is_match("axb"));

        let pattern = fuzzy_pattern("c*");
        assert_eq!(pattern, "c.*\\*");
        assert!(regex::Regex::new(&pattern).is_ok());
    }

    #[test]
    fn test_fuzzy_pattern_empty_query() {
        assert_eq!(fuzzy_pattern(""), "");
    }

    fn test_user(id: &str, role: UserRole) -> user::Model {
        user::Model {
            id: id.to_string(),
            phone_number: format!("98765{id}"),
            fname: Some("Ravi".to_string()),
            lname: None,
            email: None,
            role,
            profile_image: None,
            place: None,
            company_name: None,
            company_email: None,
            company_phone: None,
            company_gst_number: None,
            company_place: None,
            company_bio: None,
            experience_years: None,
            token: None,
            otp_hash: None,
            otp_expires_at: None,
            flag_count: 0,
            is_violated: false,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn test_project(id: &str, owner: &str) -> project::Model {
        project::Model {
            id: id.to_string(),
            title: "Courtyard home".to_string(),
            project_type: "residential".to_string(),
            construction_type: None,
            style: None,
            place: None,
            area_sqft: None,
            cost: None,
            about: None,
            created_by: owner.to_string(),
            flag_count: 0,
            is_violated: false,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[test]
    fn test_attach_listings_groups_by_owner() {
        let users = vec![
            test_user("u1", UserRole::Realtor),
            test_user("u2", UserRole::Professional),
        ];
        let projects = vec![
            test_project("p1", "u1"),
            test_project("p2", "u1"),
            test_project("p3", "u2"),
        ];

        let hits = group_listings(users, projects, vec![]);

        assert_eq!(hits[0].projects.len(), 2);
        assert_eq!(hits[1].projects.len(), 1);
        assert!(hits[0].products.is_empty());
    }

    #[test]
    fn test_attach_listings_empty_children_not_missing() {
        let users = vec![test_user("u1", UserRole::Realtor)];
        let hits = group_listings(users, vec![], vec![]);

        assert!(hits[0].projects.is_empty());
        assert!(hits[0].products.is_empty());
    }
}
