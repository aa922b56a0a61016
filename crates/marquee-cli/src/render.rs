use marquee_core::store::{CatalogItem, CatalogStore};

pub fn print_catalog(store: &CatalogStore, show_links: bool, placeholder: &str) {
    if store.visible_len() == 0 {
        println!("{}", empty_message(store));
        return;
    }
    for item in store.visible() {
        print_item(item, show_links, placeholder);
    }
    if store.visible_len() != store.all().len() {
        println!("({} of {} shown)", store.visible_len(), store.all().len());
    }
}

fn empty_message(store: &CatalogStore) -> &'static str {
    if store.filter().is_empty() {
        "The catalog is empty."
    } else {
        "No movies match the current search."
    }
}

fn print_item(item: &CatalogItem, show_links: bool, placeholder: &str) {
    let meta = item.meta_line();
    if meta.is_empty() {
        println!("{:>8}  {}", item.id(), item.title);
    } else {
        println!("{:>8}  {}  ({meta})", item.id(), item.title);
    }
    if show_links {
        println!("{:>8}  thumb: {}", "", item.thumbnail_or(placeholder));
        println!("{:>8}  link:  {}", "", item.resolved_source());
    }
}

pub fn catalog_json(store: &CatalogStore) -> serde_json::Value {
    store
        .visible()
        .map(|item| {
            let mut value = serde_json::to_value(item.entry()).unwrap_or_default();
            if let Some(obj) = value.as_object_mut() {
                obj.insert(
                    "resolved_source".into(),
                    item.resolved_source().to_string().into(),
                );
            }
            value
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use marquee_core::models::{MovieId, NewMovie};
    use marquee_core::resolver::{LinkResolver, Provider};

    use super::*;

    #[test]
    fn test_empty_message_depends_on_filter() {
        let mut store = CatalogStore::new(LinkResolver::default());
        assert_eq!(empty_message(&store), "The catalog is empty.");
        store.set_filter("", "Crime");
        assert_eq!(empty_message(&store), "No movies match the current search.");
    }

    #[test]
    fn test_json_includes_resolved_source() {
        let mut store = CatalogStore::new(LinkResolver::new(Provider::ShareLink, ""));
        store.add_locally(NewMovie::new("Heat", "mypikpak.com/s/heat").with_id(MovieId::from(1)));
        store.add_locally(NewMovie::new("Alien", "mypikpak.com/s/alien").with_id(MovieId::from(2)));
        store.set_filter("heat", "");

        let value = catalog_json(&store);
        let rows = value.as_array().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["id"], "1");
        assert_eq!(rows[0]["source"], "mypikpak.com/s/heat");
        assert_eq!(rows[0]["resolved_source"], "https://mypikpak.com/s/heat");
    }
}
