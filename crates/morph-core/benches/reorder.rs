use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use morph_core::{ListId, MemoryHost, MorphId, MorphOptions, MorphTree, NodeId};

const MEMBER_COUNT_SAMPLES: &[usize] = &[16, 64, 256, 1024];

struct ReorderFixture {
    tree: MorphTree<MemoryHost>,
    root: NodeId,
    list: ListId,
    members: Vec<MorphId>,
}

impl ReorderFixture {
    fn new(count: usize) -> Self {
        let mut host = MemoryHost::new();
        let root = host.create_element("ul");
        let mut tree = MorphTree::new(host);
        let mount = tree.create_morph(MorphOptions::default());
        tree.init_for_appending_to_element(mount, root)
            .expect("mount point");
        let list = tree.create_list();
        tree.mount_list(list, mount).expect("mount list");
        let members = (0..count)
            .map(|index| {
                let member = tree.create_morph(MorphOptions::default());
                tree.append_morph(list, member).expect("append member");
                tree.set_content(member, format!("item {index}"))
                    .expect("member content");
                tree.finish_append(member).expect("finish member");
                member
            })
            .collect();
        tree.finish_list_append(list).expect("finish list");
        tree.finish_append(mount).expect("finish mount");
        Self {
            tree,
            root,
            list,
            members,
        }
    }

    /// Reverses the list in one move transaction.
    fn reverse(&mut self) {
        self.tree.begin_move(self.list).expect("begin move");
        for &member in self.members.iter().rev() {
            self.tree
                .append_morph(self.list, member)
                .expect("move member");
        }
        self.tree.finish_move(self.list).expect("finish move");
        self.members.reverse();
    }

    /// Swaps the first and last members.
    fn swap_ends(&mut self) {
        let (Some(&first), Some(&last)) = (self.members.first(), self.members.last()) else {
            return;
        };
        self.tree.begin_move(self.list).expect("begin move");
        self.tree
            .insert_before_morph(self.list, last, Some(first))
            .expect("move last");
        self.tree
            .insert_before_morph(self.list, first, None)
            .expect("move first");
        self.tree.finish_move(self.list).expect("finish move");
        let end = self.members.len() - 1;
        self.members.swap(0, end);
    }
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("list_build");
    for &count in MEMBER_COUNT_SAMPLES {
        group.bench_with_input(BenchmarkId::new("members", count), &count, |b, &count| {
            b.iter(|| {
                let fixture = ReorderFixture::new(count);
                black_box(fixture.tree.host().children(fixture.root).len());
            });
        });
    }
    group.finish();
}

fn bench_reverse(c: &mut Criterion) {
    let mut group = c.benchmark_group("list_reverse");
    for &count in MEMBER_COUNT_SAMPLES {
        group.bench_with_input(BenchmarkId::new("members", count), &count, |b, &count| {
            let mut fixture = ReorderFixture::new(count);
            b.iter(|| {
                fixture.reverse();
                black_box(fixture.tree.list(fixture.list).map(|list| list.len()));
            });
        });
    }
    group.finish();
}

fn bench_swap_ends(c: &mut Criterion) {
    let mut fixture = ReorderFixture::new(256);

    c.bench_function("list_swap_ends", |b| {
        b.iter(|| {
            fixture.swap_ends();
        });
    });
}

criterion_group!(reorder, bench_build, bench_reverse, bench_swap_ends);
criterion_main!(reorder);
