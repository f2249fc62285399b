use maud::{html, Markup};
use rust_i18n::t;

use crate::{
    db::models::{PostRow, PostSummary},
    names,
    views::components,
};

pub fn post(post: &PostRow, related: &[PostSummary], locale: &str) -> Markup {
    html! {
        article {
            header {
                h1 { (post.title) }
                small {
                    (components::nav_link(&names::author_posts_url(post.author_id), html! { (post.author) }))
                    " · "
                    (components::nav_link(&names::category_posts_url(post.category_id), html! { (post.category) }))
                    " · "
                    (components::nav_link(&names::tag_posts_url(&post.tag), html! { "#" (post.tag) }))
                    " · "
                    (post.created_at)
                }
            }
            @for paragraph in post.body.split("\n\n") {
                p { (paragraph) }
            }
        }
        @let related: Vec<&PostSummary> = related.iter().filter(|p| p.id != post.id).collect();
        @if !related.is_empty() {
            section.related-posts {
                h3 { (t!("posts.related", locale = locale)) }
                ul {
                    @for item in related {
                        li { (components::nav_link(&names::post_url(item.id), html! { (item.title) })) }
                    }
                }
            }
        }
    }
}

pub fn list(heading: &str, posts: &[PostSummary], locale: &str) -> Markup {
    html! {
        h1 { (heading) }
        @if posts.is_empty() {
            p { (t!("posts.empty", locale = locale)) }
        } @else {
            ul {
                @for post in posts {
                    li {
                        (components::nav_link(&names::post_url(post.id), html! { (post.title) }))
                        " "
                        small { "#" (post.tag) }
                    }
                }
            }
        }
        p {
            (components::nav_link(names::PROPOSE_POST_URL, html! { (t!("posts.propose", locale = locale)) }))
        }
    }
}

pub fn search(query: &str, results: Option<&[PostSummary]>, locale: &str) -> Markup {
    html! {
        h1 { (t!("posts.search_title", locale = locale)) }
        form role="search"
             hx-get=(names::SEARCH_URL)
             hx-target="main"
             hx-push-url="true" {
            input type="search" name="q" value=(query)
                  placeholder=(t!("posts.search_placeholder", locale = locale))
                  aria-label=(t!("posts.search_placeholder", locale = locale));
            input type="submit" value=(t!("posts.search_btn", locale = locale));
        }
        @if let Some(results) = results {
            @if results.is_empty() {
                p { (t!("posts.nothing_found", query = query, locale = locale)) }
            } @else {
                ul {
                    @for post in results {
                        li { (components::nav_link(&names::post_url(post.id), html! { (post.title) })) }
                    }
                }
            }
        }
    }
}
