//! The pages the back-office ships with and the routes that lead to them.
use grid::{FilterFieldSpec, HeaderIcons, RouteTable};

use crate::pages::{FormPage, ListPage, ListSpec, MenuEntry, Page, PageContext};

pub const BOOKINGS: &str = "bookings";
pub const NEW_BOOKING: &str = "bookings.new";
pub const VEHICLES: &str = "vehicles";
pub const DRIVERS: &str = "drivers";
pub const BILLING: &str = "billing";
pub const CLAIMS: &str = "claims";

/// Built-in route table. Config `routes` entries are merged over it.
pub fn default_routes() -> RouteTable {
    RouteTable::new()
        .with(BOOKINGS, "/bookings")
        .with(NEW_BOOKING, "/bookings/new")
        .with(VEHICLES, "/fleet/vehicles")
        .with(DRIVERS, "/fleet/drivers")
        .with(BILLING, "/billing")
        .with(CLAIMS, "/claims")
}

fn layout_menu() -> Vec<MenuEntry> {
    vec![
        MenuEntry::new("Comfortable rows", "layout.comfortable"),
        MenuEntry::new("Compact rows", "layout.compact"),
    ]
}

fn export_menu() -> Vec<MenuEntry> {
    vec![
        MenuEntry::new("All rows (JSON)", "export.json"),
        MenuEntry::new("Selected rows (JSON)", "export.selected"),
    ]
}

pub fn bookings() -> ListSpec {
    ListSpec::new(BOOKINGS, "Bookings", "bookings")
        .filters(vec![
            FilterFieldSpec::text("bookingNo", "Booking No"),
            FilterFieldSpec::filter_select(
                "customer",
                "Customer",
                ["Acme Logistics", "Globex Shipping", "Initech Freight", "Umbrella Corp"],
            ),
            FilterFieldSpec::select(
                "status",
                "Status",
                ["Open", "In Transit", "Delivered", "Cancelled"],
            ),
            FilterFieldSpec::date("bookingDate", "Booking Date"),
        ])
        .actions(["edit", "view", "delete"])
        .icons(HeaderIcons::all())
        .layout_menu(layout_menu())
        .export_menu(export_menu())
        .selectable()
}

pub fn vehicles() -> ListSpec {
    ListSpec::new(VEHICLES, "Vehicles", "vehicles")
        .filters(vec![
            FilterFieldSpec::text("plateNo", "Plate"),
            FilterFieldSpec::select("type", "Type", ["Truck", "Trailer", "Van"]),
            FilterFieldSpec::select("status", "Status", ["Available", "On Trip", "Maintenance"]),
        ])
        .actions(["view", "delete"])
        .icons(HeaderIcons {
            first: true,
            fourth: true,
            fifth: true,
            ..HeaderIcons::default()
        })
}

pub fn drivers() -> ListSpec {
    ListSpec::new(DRIVERS, "Drivers", "drivers")
        .filters(vec![
            FilterFieldSpec::text("name", "Name"),
            FilterFieldSpec::select("status", "Status", ["Active", "On Leave", "Inactive"]),
        ])
        .actions(["view", "edit"])
        .icons(HeaderIcons {
            first: true,
            fifth: true,
            ..HeaderIcons::default()
        })
}

pub fn billing() -> ListSpec {
    ListSpec::new(BILLING, "Billing", "billing")
        .filters(vec![
            FilterFieldSpec::text("reference", "Reference"),
            FilterFieldSpec::date("date", "Date"),
        ])
        .actions(["view"])
        .icons(HeaderIcons {
            first: true,
            third: true,
            fifth: true,
            ..HeaderIcons::default()
        })
        .export_menu(export_menu())
        .tab_labels([
            ("invoices", "Invoices"),
            ("payments", "Payments"),
            ("creditNotes", "Credit Notes"),
        ])
        .selectable()
}

pub fn claims() -> ListSpec {
    ListSpec::new(CLAIMS, "Claims", "claims")
        .filters(vec![
            FilterFieldSpec::text("claimNo", "Claim No"),
            FilterFieldSpec::select("status", "Status", ["Filed", "Under Review", "Settled"]),
        ])
        .actions(["view", "delete"])
        .icons(HeaderIcons {
            first: true,
            fourth: true,
            fifth: true,
            ..HeaderIcons::default()
        })
}

/// Every page, in menu order.
pub fn pages(ctx: &PageContext) -> Vec<Box<dyn Page>> {
    let lists = [bookings(), vehicles(), drivers(), billing(), claims()];
    let mut pages: Vec<Box<dyn Page>> = lists
        .into_iter()
        .map(|spec| Box::new(ListPage::new(spec, ctx.clone())) as Box<dyn Page>)
        .collect();
    pages.insert(1, Box::new(FormPage::new(NEW_BOOKING, "New Booking")));
    pages
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn every_page_has_a_route() {
        let routes = default_routes();
        let ctx = PageContext::new(routes.clone(), std::env::temp_dir());
        let keys: Vec<String> = pages(&ctx).iter().map(|p| p.key().to_string()).collect();
        assert_eq!(
            keys,
            vec!["bookings", "bookings.new", "vehicles", "drivers", "billing", "claims"]
        );
        for key in &keys {
            assert!(routes.lookup(key).is_some(), "{key} has no route");
        }
        assert_eq!(routes.add_new_target(BOOKINGS).as_deref(), Some("/bookings/new"));
        assert_eq!(routes.key_for("/bookings/new"), Some(NEW_BOOKING));
    }

    #[test]
    fn list_fixtures_are_embedded() {
        let names = crate::fetch::EmbeddedFixtures::names();
        for spec in [bookings(), vehicles(), drivers(), billing(), claims()] {
            assert!(names.contains(&spec.fixture), "missing fixture {}", spec.fixture);
        }
    }
}
