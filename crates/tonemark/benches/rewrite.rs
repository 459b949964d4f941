use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use tonemark::{Capabilities, RewriteOptions, rewrite_document, tones};

fn page(links: usize) -> String {
    let mut html = String::from("<html><body>\n");
    for i in 0..links {
        match i % 3 {
            0 => html.push_str(
                "<a href=\"gradint.cgi?jsl=zh&amp;js=x\">zhong1 guo2 ren2 ni3 hao3</a>\n",
            ),
            1 => html.push_str(
                "<a href=\"gradint.cgi?jsl=zh-yue&amp;js=x\">gwong<sup>2</sup> dung<sup>1</sup></a>\n",
            ),
            _ => html.push_str("<a href=\"/elsewhere\">plain link 42</a>\n"),
        }
    }
    html.push_str("</body></html>");
    html
}

fn bench_rewrite(c: &mut Criterion) {
    let options = RewriteOptions::default();
    let mut group = c.benchmark_group("rewrite");
    group.sample_size(50);

    let sentence = "wo3 men5 xue2 xi2 zhong1 wen2 , Er4 shi2 ge4 ren2 ".repeat(64);
    group.bench_function("convert_pinyin_sentence", |b| {
        b.iter(|| tones::convert_pinyin(black_box(&sentence)).len())
    });

    for links in [30usize, 300] {
        let html = page(links);
        group.bench_function(format!("document_{links}_links"), |b| {
            b.iter(|| {
                rewrite_document(black_box(&html), Capabilities::all(), &options)
                    .mutations
                    .len()
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_rewrite);
criterion_main!(benches);
