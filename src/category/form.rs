//! Form fields shared by the new and edit category pages.

use maud::{Markup, html};

use crate::{
    html::{
        FORM_LABEL_STYLE, FORM_RADIO_GROUP_STYLE, FORM_RADIO_INPUT_STYLE, FORM_RADIO_LABEL_STYLE,
        FORM_TEXT_INPUT_STYLE,
    },
    transaction::TransactionType,
};

pub(super) fn category_form_fields(name: &str, kind: TransactionType) -> Markup {
    html! {
        div
        {
            label
                for="name"
                class=(FORM_LABEL_STYLE)
            {
                "Category Name"
            }

            input
                id="name"
                type="text"
                name="name"
                placeholder="Category Name"
                value=(name)
                required
                autofocus
                class=(FORM_TEXT_INPUT_STYLE);
        }

        fieldset class="space-y-2"
        {
            legend class=(FORM_LABEL_STYLE) { "Used for" }

            div class=(FORM_RADIO_GROUP_STYLE)
            {
                @for option in [TransactionType::Expense, TransactionType::Income] {
                    @let id = format!("category-kind-{}", option.as_str());

                    div class="flex items-center gap-3"
                    {
                        input
                            name="kind"
                            id=(id)
                            type="radio"
                            value=(option.as_str())
                            checked[option == kind]
                            required
                            tabindex="0"
                            class=(FORM_RADIO_INPUT_STYLE);

                        label for=(id) class=(FORM_RADIO_LABEL_STYLE)
                        {
                            (option.label())
                        }
                    }
                }
            }
        }
    }
}
