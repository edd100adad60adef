use maud::{Markup, Render, html};

pub fn render_table<const N: usize>(
    overall_title: impl Render,
    titles: [&'static str; N],
    items: Vec<[Markup; N]>,
) -> Markup {
    html! {
        div class="container mx-auto" {
            (overall_title)
            div class="overflow-x-auto" {
                table class="min-w-full bg-gray-800 rounded shadow-md" {
                    thead class="bg-gray-700" {
                        tr {
                            @for title in titles {
                                th class="py-2 px-4 text-left font-semibold text-gray-300" {(title)}
                            }
                        }
                    }
                    tbody {
                        @for row in items {
                            tr class="hover:bg-gray-700" {
                                @for col in row {
                                    td class="py-2 px-4 border-b border-gray-600 text-gray-200" {(col)}
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

pub fn render_nav() -> Markup {
    html! {
        nav class="w-full bg-gray-800 shadow-md px-8 py-4 mb-8 flex flex-row items-center space-x-6" {
            span class="text-lg font-bold" {"Student Mgmt"}
            a href="/" class="text-gray-300 hover:text-white" {"Students"}
        }
    }
}

pub fn title(s: impl Render) -> Markup {
    html! {
        h1 class="text-2xl font-semibold mb-4" {(s)}
    }
}

pub fn subtitle(s: impl Render) -> Markup {
    html! {
        h2 class="text-xl font-semibold mb-2" {(s)}
    }
}

pub fn form_element(id: &'static str, label: &'static str, input: Markup) -> Markup {
    html! {
        div class="mb-4" {
            label for=(id) class="block text-sm font-bold mb-2 text-gray-300" {(label)}
            (input)
        }
    }
}

pub fn simple_form_element(
    id: &'static str,
    label: &'static str,
    required: bool,
    input_type: Option<&'static str>,
    value: Option<&str>,
) -> Markup {
    form_element(
        id,
        label,
        html! {
            input required[required] type=(input_type.unwrap_or("text")) id=(id) name=(id) value=[value] class="shadow appearance-none border rounded w-full py-2 px-3 leading-tight focus:outline-none focus:shadow-outline bg-gray-700 border-gray-600" {}
        },
    )
}

pub fn spinner() -> Markup {
    html! {
        span class="inline-block h-4 w-4 animate-spin rounded-full border-2 border-white border-t-transparent" role="status" {
            span class="sr-only" {"Loading..."}
        }
    }
}

/// Submit button whose spinner shows while htmx has the request in flight.
pub fn form_submit_button(text: Option<&str>) -> Markup {
    html! {
        button type="submit" class="bg-blue-500 hover:bg-blue-700 font-bold py-2 px-4 rounded focus:outline-none focus:shadow-outline disabled:opacity-50 flex items-center space-x-2" {
            span {(text.unwrap_or("Submit"))}
            span class="htmx-indicator" {(spinner())}
        }
    }
}

pub fn modal(heading: impl Render, body: Markup) -> Markup {
    html! {
        div class="fixed inset-0 bg-black/60 flex items-center justify-center z-40" {
            div class="bg-gray-800 rounded shadow-md max-w-lg w-full p-6" {
                div class="flex flex-row items-center justify-between" {
                    (subtitle(heading))
                    button type="button" hx-post="/internal/overlay/close" hx-target="#overlay" class="text-gray-400 hover:text-white text-xl" aria-label="Close" {
                        "×"
                    }
                }
                (body)
            }
        }
    }
}
