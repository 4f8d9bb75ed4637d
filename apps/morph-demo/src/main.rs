use morph_core::{
    Content, HostTree, ListId, MemoryHost, MorphError, MorphId, MorphOptions, MorphTree,
    MorphTreeConfig, NodeId, SafeString,
};

struct Row {
    key: &'static str,
    morph: MorphId,
}

fn render_row(
    tree: &mut MorphTree<MemoryHost>,
    list: ListId,
    key: &'static str,
    reference: Option<MorphId>,
) -> Result<Row, MorphError> {
    let morph = tree.create_morph(MorphOptions::default());
    tree.insert_before_morph(list, morph, reference)?;
    tree.set_content(morph, SafeString::new(format!("<li>{key}</li>")))?;
    tree.finish_append(morph)?;
    Ok(Row { key, morph })
}

fn print_state(tree: &MorphTree<MemoryHost>, root: NodeId, mount: MorphId, title: &str) {
    println!("--- {title} ---");
    println!("{}", tree.host().outer_html(root));
    print!("{}", tree.format_tree(mount));
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    println!("=== Morph keyed list demo ===");
    println!("Set MORPH_DEBUG=1 to verify list invariants after every move.");

    let mut host = MemoryHost::new();
    let root = host.create_element("ul");
    let mut tree = MorphTree::with_config(host, MorphTreeConfig::from_env());

    let mount = tree.create_morph(MorphOptions::default());
    tree.init_for_appending_to_element(mount, root)?;
    let list = tree.create_list();
    tree.set_content(mount, Content::List(list))?;
    let mut rows = Vec::new();
    for key in ["alpha", "beta", "gamma", "delta"] {
        rows.push(render_row(&mut tree, list, key, None)?);
    }
    tree.finish_list_append(list)?;
    tree.finish_append(mount)?;
    print_state(&tree, root, mount, "initial render");

    // Next state: delta, alpha, epsilon, gamma (beta removed).
    {
        let mut transaction = tree.begin_move_transaction(list)?;
        let beta = rows.remove(1);
        transaction.remove(beta.morph)?;
        let delta = rows.remove(2);
        transaction.insert_before(delta.morph, Some(rows[0].morph))?;
        rows.insert(0, delta);
        let epsilon = render_row(&mut transaction, list, "epsilon", Some(rows[2].morph))?;
        rows.insert(2, epsilon);
        transaction.finish()?;
        log::info!("removed {} ({})", beta.key, beta.morph);
    }
    print_state(&tree, root, mount, "after keyed update");

    {
        let mut transaction = tree.begin_move_transaction(list)?;
        for row in rows.drain(..) {
            transaction.remove(row.morph)?;
        }
        transaction.finish()?;
    }
    print_state(&tree, root, mount, "after removing every row");

    let placeholder = tree
        .morph(mount)
        .and_then(|entry| entry.first_node())
        .map(|node| tree.host().kind(node));
    println!("placeholder node: {placeholder:?}");
    println!("live morphs: {}", tree.live_morph_count());
    Ok(())
}
