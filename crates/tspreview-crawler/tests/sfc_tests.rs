use super::*;

fn extract(path: &str, text: &str) -> Option<EmbeddedScript> {
    SfcScriptExtractor.extract(Path::new(path), text)
}

#[test]
fn vue_prefers_script_setup() {
    let text = "<script lang=\"ts\">export default {}</script>\n\
                <script setup lang=\"ts\">defineProps<{ a: string }>()</script>\n\
                <template><div /></template>";
    let script = extract("/app/Comp.vue", text).unwrap();
    assert_eq!(script.text, "defineProps<{ a: string }>()");
    assert_eq!(
        &text[script.offset as usize..script.offset as usize + script.text.len()],
        script.text
    );
}

#[test]
fn vue_falls_back_to_the_plain_block() {
    let script = extract("/app/Comp.vue", "<template/>\n<script>const a = 1;</script>").unwrap();
    assert_eq!(script.text, "const a = 1;");
}

#[test]
fn svelte_prefers_the_instance_script() {
    let text = "<script context=\"module\">export const x = 1;</script>\n\
                <script lang=\"ts\">export let name: string;</script>\n<h1>{name}</h1>";
    assert_eq!(
        extract("/app/Hello.svelte", text).unwrap().text,
        "export let name: string;"
    );
    let runes = "<script module>export const x = 1;</script><script>let { a } = $props();</script>";
    assert_eq!(
        extract("/app/Hello.svelte", runes).unwrap().text,
        "let { a } = $props();"
    );
}

#[test]
fn files_without_scripts() {
    assert!(extract("/app/Comp.vue", "<template><div /></template>").is_none());
    assert!(extract("/app/Comp.ts", "<script>x</script>").is_none());
    // Other elements that merely start with `script`.
    assert!(extract("/app/Comp.vue", "<scripts>x</scripts>").is_none());
}

#[test]
fn unterminated_blocks_run_to_the_end() {
    let script = extract("/app/Comp.svelte", "<script>let a = 1;").unwrap();
    assert_eq!(script.text, "let a = 1;");
    assert_eq!(script.offset, 8);
}
