use super::*;

fn loc(path: &str) -> ResourceLocation {
    ResourceLocation::parse(path).unwrap()
}

fn pack() -> MemorySource {
    MemorySource::new()
        .with(loc("textures/block/lava.png"), "lava")
        .with(loc("textures_old/block/lava.png"), "old")
        .with(loc("textures"), "bare")
        .with(loc("minecraft:texturesheet.png"), "sheet")
}

#[test]
fn prefix_matches_whole_segments() {
    let src = pack();
    let listed = src
        .list(PackType::ClientResources, "minecraft", "textures", &|_| true)
        .unwrap();
    assert_eq!(listed, vec![loc("textures"), loc("textures/block/lava.png")]);

    let nested = src
        .list(PackType::ClientResources, "minecraft", "textures/block/", &|_| true)
        .unwrap();
    assert_eq!(nested, vec![loc("textures/block/lava.png")]);
}

#[test]
fn empty_prefix_lists_the_whole_namespace() {
    let src = pack();
    let all = src
        .list(PackType::ClientResources, "minecraft", "", &|_| true)
        .unwrap();
    assert_eq!(all.len(), 4);
    assert!(
        src.list(PackType::ServerData, "minecraft", "", &|_| true)
            .unwrap()
            .is_empty()
    );
}

#[test]
fn missing_entries_are_not_found() {
    let src = pack();
    assert!(src.contains(PackType::ClientResources, &loc("textures")));
    assert!(matches!(
        src.find(PackType::ClientResources, &loc("textures/none.png")),
        Err(TextureError::ResourceNotFound { .. })
    ));
}
