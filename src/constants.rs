//! Code tables shared by search filters and statistics.
//!
//! Category, location and organization-type codes are opaque integers agreed
//! with the frontend; 0 is the "all" sentinel and never appears in stored
//! data.

/// Sentinel meaning "no category filter".
pub const ALL_CATEGORIES: i32 = 0;

/// Sentinel meaning "no location filter".
pub const ALL_LOCATIONS: i32 = 0;

/// Sentinel meaning "no organization-type filter".
pub const ALL_ORGANIZATION_TYPES: i32 = 0;

/// Salary type code for listings without a fixed range.
pub const SALARY_TYPE_NEGOTIABLE: i32 = 5;

/// Locations always present in the locations report, even with zero jobs.
pub const MAJOR_LOCATIONS: &[i32] = &[1, 2, 3, 4, 5, 6];

/// Representative image per major location, same index as `MAJOR_LOCATIONS`.
pub const MAJOR_LOCATION_IMAGES: &[&str] = &[
    "/static/locations/hanoi.jpg",
    "/static/locations/hcmc.jpg",
    "/static/locations/danang.jpg",
    "/static/locations/haiphong.jpg",
    "/static/locations/cantho.jpg",
    "/static/locations/hue.jpg",
];
